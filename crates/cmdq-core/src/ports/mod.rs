//! Ports - seams the engine depends on.
//!
//! Time, ID generation and the failure sink are traits so tests can pin them
//! down and embedders can route failure records wherever they like.

pub mod clock;
pub mod failure_sink;
pub mod id_generator;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::failure_sink::{FailureSink, InMemoryFailureSink, TracingFailureSink};
pub use self::id_generator::{IdGenerator, UlidGenerator};
