//! Regression test parameters and operations

use morphotrack_core::{LabelVolume, Volume};
use std::collections::HashMap;
use std::fmt::Debug;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare results with expectations (default)
    #[default]
    Compare,
    /// Compare and also print every volume under comparison
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, the running comparison index and every recorded
/// failure, so one test function can run many checks and report them all.
pub struct RegParams {
    /// Name of the test (e.g., "watershed")
    pub test_name: String,
    /// Current test index (incremented before each comparison)
    index: usize,
    pub mode: RegTestMode,
    success: bool,
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) -> bool {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
        false
    }

    /// Compare two floating-point values
    ///
    /// Returns `true` if they match within `delta`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta || diff.is_nan() {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Record a boolean check
    pub fn check(&mut self, condition: bool, what: &str) -> bool {
        self.index += 1;
        if condition {
            true
        } else {
            let msg = format!(
                "Failure in {}_reg: check for index {} - {}",
                self.test_name, self.index, what
            );
            self.fail(msg)
        }
    }

    /// Compare two volumes for exact equality of shape and samples
    pub fn compare_volumes<T>(&mut self, expected: &Volume<T>, actual: &Volume<T>) -> bool
    where
        T: PartialEq + Debug,
    {
        self.index += 1;

        if self.display() {
            eprintln!("index {} expected:\n{}", self.index, render(expected));
            eprintln!("index {} actual:\n{}", self.index, render(actual));
        }

        if expected.dims() != actual.dims() {
            let msg = format!(
                "Failure in {}_reg: volume comparison for index {} - dimension mismatch {:?} vs {:?}",
                self.test_name,
                self.index,
                expected.dims(),
                actual.dims()
            );
            return self.fail(msg);
        }

        if let Some(i) = expected
            .data()
            .iter()
            .zip(actual.data())
            .position(|(a, b)| a != b)
        {
            let msg = format!(
                "Failure in {}_reg: volume comparison for index {} - sample mismatch at {:?}: {:?} vs {:?}",
                self.test_name,
                self.index,
                expected.coords_of(i),
                expected.data()[i],
                actual.data()[i]
            );
            return self.fail(msg);
        }

        true
    }

    /// Compare two label volumes up to a renaming of the nonzero labels
    ///
    /// Background must match exactly; every expected label must map to
    /// exactly one actual label and vice versa.
    pub fn compare_partitions(&mut self, expected: &LabelVolume, actual: &LabelVolume) -> bool {
        self.index += 1;

        if expected.dims() != actual.dims() {
            let msg = format!(
                "Failure in {}_reg: partition comparison for index {} - dimension mismatch",
                self.test_name, self.index
            );
            return self.fail(msg);
        }

        let mut forward: HashMap<u32, u32> = HashMap::new();
        let mut backward: HashMap<u32, u32> = HashMap::new();
        for (i, (&e, &a)) in expected.data().iter().zip(actual.data()).enumerate() {
            let consistent = (e == 0) == (a == 0)
                && *forward.entry(e).or_insert(a) == a
                && *backward.entry(a).or_insert(e) == e;
            if !consistent {
                let msg = format!(
                    "Failure in {}_reg: partition comparison for index {} - labels {} vs {} at {:?}",
                    self.test_name,
                    self.index,
                    e,
                    a,
                    expected.coords_of(i)
                );
                return self.fail(msg);
            }
        }

        true
    }

    /// Report results
    ///
    /// Returns `true` if all comparisons passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all comparisons have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

/// Text rendering of a volume, one row per line and one block per 2-D
/// plane. Volumes with more than three axes are printed flat.
fn render<T: Debug>(volume: &Volume<T>) -> String {
    let dims = volume.dims();
    if dims.len() > 3 {
        return format!("{:?} {:?}", dims, volume.data());
    }
    let width = dims[0];
    let mut out = String::new();
    for (n, row) in volume.data().chunks(width).enumerate() {
        if dims.len() == 3 && n > 0 && n % dims[1] == 0 {
            out.push('\n');
        }
        let cells: Vec<String> = row.iter().map(|v| format!("{:?}", v)).collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}
