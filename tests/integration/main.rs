//! Integration tests: full scans against in-memory collaborators.

mod mock_channel;
mod mock_provider;
mod scan;
