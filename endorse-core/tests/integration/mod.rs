//! End-to-end rounds against the in-process peers and orderer.

mod commit_flow;
mod config_loading;
