//! Sentinel Agent - Autonomous repository agent
//!
//! This crate implements a recurring, single-actor decision-and-action cycle:
//! load durable state, ask an LLM oracle to pick one action from a fixed
//! vocabulary (weighted by recent history), execute that action against
//! external collaborators, then record the outcome and persist state.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod engine;
pub mod ports;
