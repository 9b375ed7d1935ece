// Parameter state — named tensors for saving and restoring models

use crate::error::{Error, Result};

/// A single parameter value: a shape plus row-major f32 data.
///
/// This is the unit of model persistence. Equality is element-exact, which
/// is what makes the save/load round-trip law checkable.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Dimensions, outermost first (e.g. `[out_features, in_features]`).
    pub shape: Vec<usize>,
    /// Row-major element data; `data.len()` must equal the shape's product.
    pub data: Vec<f32>,
}

impl Param {
    /// Create a parameter, validating that the data length matches the shape.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::msg(format!(
                "parameter data has {} elements, shape {:?} requires {}",
                data.len(),
                shape,
                expected
            )));
        }
        Ok(Param { shape, data })
    }

    /// Total number of scalar elements.
    pub fn elem_count(&self) -> usize {
        self.data.len()
    }
}

/// An ordered mapping from parameter name to value.
///
/// Ordered so that serialization is deterministic and so a model can be
/// rebuilt layer by layer in definition order.
pub type StateDict = Vec<(String, Param)>;

/// Look up a parameter by name.
pub fn find_param<'a>(state: &'a StateDict, name: &str) -> Option<&'a Param> {
    state.iter().find(|(n, _)| n == name).map(|(_, p)| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_validates_element_count() {
        assert!(Param::new(vec![2, 3], vec![0.0; 6]).is_ok());
        assert!(Param::new(vec![2, 3], vec![0.0; 5]).is_err());
    }

    #[test]
    fn find_param_by_name() {
        let state: StateDict = vec![
            ("fc1.weight".to_string(), Param::new(vec![2], vec![1.0, 2.0]).unwrap()),
            ("fc1.bias".to_string(), Param::new(vec![1], vec![0.5]).unwrap()),
        ];
        assert_eq!(find_param(&state, "fc1.bias").unwrap().data, vec![0.5]);
        assert!(find_param(&state, "fc9.weight").is_none());
    }
}
