use crate::error::{Error, Result};

/// How the winding of input areas is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Winding {
    /// Areas must be counterclockwise (positive signed area in a y-up frame).
    ///
    /// Clockwise areas are rejected with [`Error::InvalidInput`].
    #[default]
    CounterClockwise,
    /// The orientation of each area is detected and clockwise areas are reversed.
    Detect,
}

/// Order in which the segments are inserted in the trapezoidal map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionOrder {
    /// Segments are inserted in the order they are discovered while walking the areas.
    #[default]
    Discovery,
    /// Segments are shuffled with a seeded random number generator before insertion.
    ///
    /// This is what gives the expected *O*(log(*n*)) query time on adversarial inputs such as
    /// regular grids.
    Shuffled { seed: u64 },
}

/// Options controlling how a trapezoidal map is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    pub winding: Winding,
    pub insertion_order: InsertionOrder,
    /// Horizontal offset applied to one endpoint of every vertical edge.
    pub degenerate_epsilon: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            winding: Winding::default(),
            insertion_order: InsertionOrder::default(),
            degenerate_epsilon: 1e-9,
        }
    }
}

impl BuildOptions {
    pub fn with_winding(mut self, winding: Winding) -> Self {
        self.winding = winding;
        self
    }

    pub fn with_insertion_order(mut self, insertion_order: InsertionOrder) -> Self {
        self.insertion_order = insertion_order;
        self
    }

    /// Shorthand for [`InsertionOrder::Shuffled`].
    pub fn shuffled(self, seed: u64) -> Self {
        self.with_insertion_order(InsertionOrder::Shuffled { seed })
    }

    pub fn with_degenerate_epsilon(mut self, degenerate_epsilon: f64) -> Self {
        self.degenerate_epsilon = degenerate_epsilon;
        self
    }

    /// Checks that the options can be used to build a map.
    pub fn validate(&self) -> Result<()> {
        if !(self.degenerate_epsilon.is_finite() && self.degenerate_epsilon > 0.) {
            return Err(Error::invalid_input(format!(
                "degenerate epsilon must be finite and positive, got {}",
                self.degenerate_epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_options_are_valid() {
        let options = BuildOptions::default();

        assert_eq!(options.winding, Winding::CounterClockwise);
        assert_eq!(options.insertion_order, InsertionOrder::Discovery);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn builder_methods() {
        let options = BuildOptions::default()
            .with_winding(Winding::Detect)
            .shuffled(42)
            .with_degenerate_epsilon(1e-6);

        assert_eq!(options.winding, Winding::Detect);
        assert_eq!(options.insertion_order, InsertionOrder::Shuffled { seed: 42 });
        assert_eq!(options.degenerate_epsilon, 1e-6);
    }

    #[rstest]
    #[case(0.)]
    #[case(-1e-9)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn invalid_epsilon(#[case] epsilon: f64) {
        let options = BuildOptions::default().with_degenerate_epsilon(epsilon);

        assert!(matches!(
            options.validate(),
            Err(Error::InvalidInput { .. })
        ));
    }
}
