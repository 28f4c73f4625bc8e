//! Built-in benchmark definitions runnable by name from the command line

use crate::body::Done;
use crate::cli::execute::Definition;
use crate::error::Result;
use crate::suite::Suite;
use std::hint::black_box;
use std::time::Duration;

/// Names and definitions available to the `simplebench` binary
pub const DEFINITIONS: &[(&str, Definition)] = &[("arrays", arrays), ("timers", timers)];

/// Callback iteration against an index loop, over a small and a large array.
/// Both variants sum the array; `forEach` reaches every element through a
/// fresh callback that the optimizer cannot see through.
pub fn arrays(suite: &mut Suite) -> Result<()> {
    for (group, len) in [("small", 4u64), ("large", 10_000)] {
        let data: Vec<u64> = (0..len).collect();
        suite.group(group, move |s| {
            let values = data.clone();
            s.add("forEach", move |done: Done| {
                let mut sum = 0u64;
                {
                    let mut visit: Box<dyn FnMut(u64, usize, &[u64]) + '_> =
                        Box::new(|value: u64, index: usize, array: &[u64]| {
                            sum = sum.wrapping_add(black_box(value));
                            black_box((index, array.len()));
                        });
                    let visit = black_box(&mut visit);
                    values
                        .iter()
                        .enumerate()
                        .for_each(|(index, value)| visit(*value, index, values.as_slice()));
                }
                black_box(sum);
                done.complete();
            });

            let values = data;
            s.add("for", move |done: Done| {
                let array = values.as_slice();
                let len = array.len();
                let mut sum = 0u64;
                let mut index = 0;
                while index < len {
                    sum = sum.wrapping_add(black_box(array[index]));
                    index += 1;
                }
                black_box(sum);
                done.complete();
            });
            Ok(())
        })?;
    }
    Ok(())
}

/// A body that completes from a 10 ms timer
pub fn timers(suite: &mut Suite) -> Result<()> {
    suite.add_async("sleep 10ms", || async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok::<(), std::io::Error>(())
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    use crate::cli::execute::find_definition;

    #[test]
    fn test_find_known_definitions() {
        assert!(find_definition(DEFINITIONS, "arrays").is_ok());
        assert!(find_definition(DEFINITIONS, "timers").is_ok());
    }

    #[test]
    fn test_unknown_definition_lists_available() {
        let err = find_definition(DEFINITIONS, "nope").unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("arrays, timers"));
    }

    #[test]
    fn test_arrays_registers_two_groups() {
        let mut suite = Suite::new(Config::default());
        arrays(&mut suite).unwrap();
        assert_eq!(suite.registry().group_names(), vec!["small", "large"]);
        assert_eq!(suite.registry().test_count(), 4);
    }
}
