#![allow(dead_code)]

// Each test binary uses a different subset of these.
#[allow(unused_imports)]
pub use gridjob_test_utils::builders::{mock_store, JobBuilder};
#[allow(unused_imports)]
pub use gridjob_test_utils::fake_backend::FakeGridBackend;
#[allow(unused_imports)]
pub use gridjob_test_utils::{init_tracing, with_timeout};

use gridjob::types::GridName;

pub fn grid(name: &str) -> GridName {
    name.parse().expect("valid grid name")
}
