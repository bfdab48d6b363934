//! Collaborator implementations for the Gantry event gate: GitHub REST
//! transport, tracking comments, branch planning, event-data fetching,
//! prompt rendering, tool-server configuration, and workflow outputs.

pub mod branch_setup;
pub mod data_fetch;
pub mod fs_util;
pub mod github_api_client;
pub mod outputs;
pub mod prompt;
pub mod tool_server;
pub mod tracking_comment;
