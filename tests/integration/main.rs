//! Integration tests: full dashboard flows against an in-memory agent.

mod dashboard_flow;
mod mock_agent;
mod scan_schedule;
