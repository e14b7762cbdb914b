use std::borrow::Cow;

use crate::error::{CodecError, Result};

/// One coordinate position.
pub type Tuple = Vec<f64>;

/// Ordered tuples sharing one dimension.
///
/// The dimension is taken from the first tuple stored and is `None` while the
/// store is empty. Validated entry points ([`TupleStore::set_tuples`],
/// [`TupleStore::push`]) reject tuples of a different length; appends through
/// [`TupleStore::live_view`] are not re-checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TupleStore {
    tuples: Vec<Tuple>,
    dimension: Option<usize>,
}

fn check_tuples(tuples: &[Tuple]) -> Result<Option<usize>> {
    let Some(first) = tuples.first() else {
        return Ok(None);
    };
    let dimension = first.len();
    for (i, t) in tuples.iter().enumerate() {
        if t.is_empty() {
            return Err(CodecError::InvalidTupleType(i));
        }
        if t.len() != dimension {
            return Err(CodecError::DimensionMismatch {
                expected: dimension,
                actual: t.len(),
            });
        }
    }
    Ok(Some(dimension))
}

impl TupleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store that takes ownership of `tuples`.
    pub fn from_tuples(tuples: Vec<Tuple>) -> Result<Self> {
        let mut store = Self::new();
        store.set_tuples(Cow::Owned(tuples), true)?;
        Ok(store)
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn count(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Replaces every stored tuple.
    ///
    /// With `adopt` set, an owned vector is moved in as-is. Anything else is
    /// deep-copied tuple by tuple.
    pub fn set_tuples(&mut self, tuples: Cow<'_, [Tuple]>, adopt: bool) -> Result<()> {
        let dimension = check_tuples(&tuples)?;
        self.tuples = match tuples {
            Cow::Owned(v) if adopt => v,
            other => other.iter().cloned().collect(),
        };
        self.dimension = dimension;
        Ok(())
    }

    /// Appends one tuple, checking it against the established dimension.
    pub fn push(&mut self, tuple: Tuple) -> Result<()> {
        if tuple.is_empty() {
            return Err(CodecError::InvalidTupleType(self.tuples.len()));
        }
        match self.dimension {
            Some(d) if d != tuple.len() => Err(CodecError::DimensionMismatch {
                expected: d,
                actual: tuple.len(),
            }),
            _ => {
                self.live_view().push(tuple);
                Ok(())
            }
        }
    }

    /// Mutable handle on the backing sequence.
    pub fn live_view(&mut self) -> LiveView<'_> {
        LiveView { store: self }
    }

    /// Owned copy suitable for indexed access. `_allow_live` is accepted for
    /// symmetry with [`TupleStore::sequential_access_view`]; the result is
    /// always a copy.
    pub fn random_access_view(&self, _allow_live: bool) -> Cow<'_, [Tuple]> {
        Cow::Owned(self.tuples.clone())
    }

    /// Sequence for one pass of iteration, borrowed when `allow_live`.
    pub fn sequential_access_view(&self, allow_live: bool) -> Cow<'_, [Tuple]> {
        if allow_live {
            Cow::Borrowed(&self.tuples)
        } else {
            Cow::Owned(self.tuples.clone())
        }
    }

    pub fn as_array(&self, allow_live_array: bool) -> Cow<'_, [Tuple]> {
        self.sequential_access_view(allow_live_array)
    }

    /// Seeds an empty store or appends through the live view.
    ///
    /// Readers use this so that a run read into a fresh store establishes its
    /// dimension, while reads into a populated store extend it unchecked.
    pub(crate) fn seed_or_append(&mut self, tuples: Vec<Tuple>) -> Result<()> {
        if self.is_empty() {
            self.set_tuples(Cow::Owned(tuples), true)
        } else {
            // 次元は検査しないが、空のタプルは受け付けない
            if let Some(i) = tuples.iter().position(|t| t.is_empty()) {
                return Err(CodecError::InvalidTupleType(self.count() + i));
            }
            let mut live = self.live_view();
            for t in tuples {
                live.push(t);
            }
            Ok(())
        }
    }
}

/// Mutable alias of a [`TupleStore`]'s tuples.
#[derive(Debug)]
pub struct LiveView<'a> {
    store: &'a mut TupleStore,
}

impl LiveView<'_> {
    /// Appends without checking the store's dimension. The first tuple pushed
    /// into an empty store fixes the dimension.
    pub fn push(&mut self, tuple: Tuple) {
        if self.store.dimension.is_none() {
            self.store.dimension = Some(tuple.len());
        }
        self.store.tuples.push(tuple);
    }

    pub fn len(&self) -> usize {
        self.store.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.tuples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tuple> {
        self.store.tuples.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tuple> {
        self.store.tuples.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tuple> {
        self.store.tuples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = TupleStore::new();
        assert_eq!(store.dimension(), None);
        assert_eq!(store.count(), 0);
        assert!(store.as_array(false).is_empty());
    }

    #[test]
    fn test_set_tuples_infers_dimension() {
        let mut store = TupleStore::new();
        let input = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        store.set_tuples(Cow::Borrowed(&input), false).unwrap();
        assert_eq!(store.dimension(), Some(2));
        assert_eq!(store.count(), 2);

        store.set_tuples(Cow::Owned(Vec::new()), true).unwrap();
        assert_eq!(store.dimension(), None);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_set_tuples_rejects_mixed_dimensions() {
        let mut store = TupleStore::new();
        let err = store
            .set_tuples(Cow::Owned(vec![vec![1.0, 2.0], vec![3.0]]), true)
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
        // 失敗時は元の内容を保持
        assert_eq!(store.count(), 0);

        let err = store
            .set_tuples(Cow::Owned(vec![Vec::new()]), true)
            .unwrap_err();
        assert_eq!(err, CodecError::InvalidTupleType(0));
    }

    #[test]
    fn test_set_tuples_adopts_only_when_asked() {
        let mut store = TupleStore::new();
        let input = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let buffer = input.as_ptr();
        store.set_tuples(Cow::Owned(input), true).unwrap();
        assert_eq!(store.tuples.as_ptr(), buffer);

        let input = vec![vec![5.0, 6.0]];
        let buffer = input.as_ptr();
        store.set_tuples(Cow::Owned(input), false).unwrap();
        assert_ne!(store.tuples.as_ptr(), buffer);
        assert_eq!(store.tuples, vec![vec![5.0, 6.0]]);

        let input = vec![vec![7.0, 8.0]];
        store.set_tuples(Cow::Borrowed(&input), true).unwrap();
        assert_ne!(store.tuples.as_ptr(), input.as_ptr());
        assert_eq!(store.tuples, input);
    }

    #[test]
    fn test_seed_or_append_rejects_empty_tuples() {
        let mut store = TupleStore::from_tuples(vec![vec![1.0, 2.0]]).unwrap();
        let err = store
            .seed_or_append(vec![vec![3.0, 4.0], Vec::new()])
            .unwrap_err();
        assert_eq!(err, CodecError::InvalidTupleType(2));
        // 途中までの追加も行わない
        assert_eq!(store.count(), 1);

        // 次元違いはそのまま追加される
        store.seed_or_append(vec![vec![5.0]]).unwrap();
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_push_is_validated_live_view_is_not() {
        let mut store = TupleStore::from_tuples(vec![vec![1.0, 2.0]]).unwrap();
        assert!(store.push(vec![3.0, 4.0]).is_ok());
        assert!(matches!(
            store.push(vec![5.0]),
            Err(CodecError::DimensionMismatch { .. })
        ));

        store.live_view().push(vec![5.0]);
        assert_eq!(store.count(), 3);
        assert_eq!(store.dimension(), Some(2));
    }

    #[test]
    fn test_live_view_fixes_dimension_of_empty_store() {
        let mut store = TupleStore::new();
        let mut live = store.live_view();
        live.push(vec![1.0, 2.0, 3.0]);
        assert_eq!(live.len(), 1);
        assert_eq!(store.dimension(), Some(3));
    }

    #[test]
    fn test_snapshots_are_independent() {
        let mut store = TupleStore::from_tuples(vec![vec![1.0], vec![2.0]]).unwrap();
        let random = store.random_access_view(true).into_owned();
        let sequential = store.sequential_access_view(false).into_owned();

        store.live_view().get_mut(0).unwrap()[0] = 9.0;

        assert_eq!(random[0], vec![1.0]);
        assert_eq!(sequential[0], vec![1.0]);
        assert!(matches!(store.random_access_view(true), Cow::Owned(_)));
        assert!(matches!(store.sequential_access_view(true), Cow::Borrowed(_)));
        assert_eq!(store.sequential_access_view(true)[0], vec![9.0]);
    }
}
