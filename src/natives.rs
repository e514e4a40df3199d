//! Host functions installed into the global environment.

use chrono::Utc;
use log::debug;

use crate::callable::NativeFunction;
use crate::value::Value;

/// The natives every interpreter gets by default.
pub fn standard() -> Vec<NativeFunction> {
    vec![NativeFunction::new("clock", 0, clock)]
}

/// Seconds since the Unix epoch, with millisecond resolution.
fn clock(_args: &[Value]) -> Result<Value, String> {
    let seconds = Utc::now().timestamp_millis() as f64 / 1000.0;
    debug!("clock() -> {}", seconds);
    Ok(Value::Number(seconds))
}

#[cfg(test)]
mod natives_tests {
    use super::*;

    #[test]
    fn standard_registry_exposes_clock() {
        let natives = standard();
        assert_eq!(natives.len(), 1);
        assert_eq!(natives[0].name, "clock");
        assert_eq!(natives[0].arity, 0);
    }

    #[test]
    fn clock_returns_positive_seconds() {
        match clock(&[]) {
            Ok(Value::Number(n)) => assert!(n > 1_600_000_000.0),
            other => panic!("unexpected clock result: {:?}", other),
        }
    }
}
