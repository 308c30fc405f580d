use ndarray::Array1;
use thiserror::Error;

use crate::Values;

/// Errors that can occur when declaring or reading a [`DesignSpace`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DesignSpaceError {
    #[error("variable `{0}` is already declared")]
    Duplicate(String),

    #[error("variable `{name}`: expected {expected} component(s), got {found}")]
    Size {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("variable `{name}`: lower bound {lower} exceeds upper bound {upper}")]
    Bounds { name: String, lower: f64, upper: f64 },

    #[error("variable `{name}`: value {value} lies outside [{lower}, {upper}]")]
    OutOfBounds {
        name: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("variable `{0}` is not in the design space")]
    MissingVariable(String),

    #[error("expected {expected} design value(s), got {found}")]
    VectorLength { expected: usize, found: usize },
}

/// A bounded design variable with a current value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    name: String,
    lower: Vec<f64>,
    upper: Vec<f64>,
    value: Vec<f64>,
}

impl Variable {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.value.len()
    }

    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    #[must_use]
    pub fn value(&self) -> &[f64] {
        &self.value
    }

    fn check(&self) -> Result<(), DesignSpaceError> {
        let expected = self.value.len();
        for found in [self.lower.len(), self.upper.len()] {
            if found != expected {
                return Err(DesignSpaceError::Size {
                    name: self.name.clone(),
                    expected,
                    found,
                });
            }
        }
        for ((&lower, &upper), &value) in self.lower.iter().zip(&self.upper).zip(&self.value) {
            if lower > upper {
                return Err(DesignSpaceError::Bounds {
                    name: self.name.clone(),
                    lower,
                    upper,
                });
            }
            if !(lower <= value && value <= upper) {
                return Err(DesignSpaceError::OutOfBounds {
                    name: self.name.clone(),
                    value,
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }
}

/// An ordered set of bounded variables.
///
/// The space flattens its variables into a single solver vector in
/// declaration order and maps such vectors back to named [`Values`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct DesignSpace {
    variables: Vec<Variable>,
}

impl DesignSpace {
    /// Creates an empty design space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a variable with per-component bounds and current value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken, the lengths differ, or the
    /// value lies outside the bounds.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        lower: Vec<f64>,
        upper: Vec<f64>,
        value: Vec<f64>,
    ) -> Result<(), DesignSpaceError> {
        let variable = Variable {
            name: name.into(),
            lower,
            upper,
            value,
        };
        if self.variable(&variable.name).is_some() {
            return Err(DesignSpaceError::Duplicate(variable.name));
        }
        variable.check()?;
        self.variables.push(variable);
        Ok(())
    }

    /// Builder-style declaration of a scalar variable.
    ///
    /// # Errors
    ///
    /// See [`DesignSpace::add_variable`].
    pub fn with_scalar(
        mut self,
        name: impl Into<String>,
        lower: f64,
        upper: f64,
        value: f64,
    ) -> Result<Self, DesignSpaceError> {
        self.add_variable(name, vec![lower], vec![upper], vec![value])?;
        Ok(self)
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Returns the variable names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(Variable::name)
    }

    /// Returns the total number of components.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.variables.iter().map(Variable::size).sum()
    }

    /// Returns `[lower, upper]` for every component, in solver order.
    #[must_use]
    pub fn bounds(&self) -> Vec<[f64; 2]> {
        self.variables
            .iter()
            .flat_map(|v| v.lower.iter().zip(&v.upper).map(|(&l, &u)| [l, u]))
            .collect()
    }

    /// Returns the current values of all variables.
    #[must_use]
    pub fn current_values(&self) -> Values {
        self.variables
            .iter()
            .map(|v| (v.name.clone(), Array1::from(v.value.clone())))
            .collect()
    }

    /// Replaces current values; variables absent from `values` keep theirs.
    ///
    /// # Errors
    ///
    /// Returns an error if a given value has the wrong size or lies outside
    /// its bounds. The space is left untouched on error.
    pub fn set_current_values(&mut self, values: &Values) -> Result<(), DesignSpaceError> {
        let mut updated = self.variables.clone();
        for variable in &mut updated {
            if let Some(value) = values.get(&variable.name) {
                variable.value = value.to_vec();
                if variable.value.len() != variable.lower.len() {
                    return Err(DesignSpaceError::Size {
                        name: variable.name.clone(),
                        expected: variable.lower.len(),
                        found: variable.value.len(),
                    });
                }
                variable.check()?;
            }
        }
        self.variables = updated;
        Ok(())
    }

    /// Flattens named values into a solver vector.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is missing or has the wrong size.
    pub fn to_vector(&self, values: &Values) -> Result<Vec<f64>, DesignSpaceError> {
        let mut x = Vec::with_capacity(self.dimension());
        for variable in &self.variables {
            let value = values
                .get(&variable.name)
                .ok_or_else(|| DesignSpaceError::MissingVariable(variable.name.clone()))?;
            if value.len() != variable.size() {
                return Err(DesignSpaceError::Size {
                    name: variable.name.clone(),
                    expected: variable.size(),
                    found: value.len(),
                });
            }
            x.extend(value.iter().copied());
        }
        Ok(x)
    }

    /// Splits a solver vector into named values.
    ///
    /// # Errors
    ///
    /// Returns [`DesignSpaceError::VectorLength`] if `x` has the wrong length.
    pub fn from_vector(&self, x: &[f64]) -> Result<Values, DesignSpaceError> {
        if x.len() != self.dimension() {
            return Err(DesignSpaceError::VectorLength {
                expected: self.dimension(),
                found: x.len(),
            });
        }
        let mut offset = 0;
        let mut values = Values::new();
        for variable in &self.variables {
            let end = offset + variable.size();
            values.insert(variable.name.clone(), Array1::from(x[offset..end].to_vec()));
            offset = end;
        }
        Ok(values)
    }
}
