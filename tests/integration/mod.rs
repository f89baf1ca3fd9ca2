//! Integration tests for the strengths coach server.

mod api_test;
mod report_test;
mod session_flow_test;
mod support;
