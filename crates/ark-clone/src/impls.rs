//! [`DeepClone`] for standard and ecosystem value types.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::path::PathBuf;

use bytes::Bytes;
use regex::Regex;
use url::Url;
use uuid::Uuid;

use crate::error::{CloneError, CloneResult};
use crate::session::CloneSession;
use crate::traits::DeepClone;

macro_rules! impl_by_clone {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl DeepClone for $ty {
                const IMMUTABLE: bool = true;

                fn clone_with(&self, _session: &mut CloneSession<'_>) -> CloneResult<Self> {
                    Ok(self.clone())
                }
            }
        )+
    };
}

impl_by_clone!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, (),
    &'static str, String, PathBuf, Bytes, Uuid, Regex, Url,
);

impl<T: DeepClone> DeepClone for Option<T> {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        self.as_ref().map(|v| v.clone_with(session)).transpose()
    }
}

impl<T: DeepClone> DeepClone for Box<T> {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        Ok(Box::new((**self).clone_with(session)?))
    }
}

impl<T: DeepClone> DeepClone for Vec<T> {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        self.iter().map(|v| v.clone_with(session)).collect()
    }
}

impl<T: DeepClone> DeepClone for VecDeque<T> {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        self.iter().map(|v| v.clone_with(session)).collect()
    }
}

impl<T: DeepClone, const N: usize> DeepClone for [T; N] {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        let items = self
            .iter()
            .map(|v| v.clone_with(session))
            .collect::<CloneResult<Vec<T>>>()?;
        items.try_into().map_err(|_| CloneError::TypeMismatch {
            type_name: std::any::type_name::<Self>(),
        })
    }
}

impl<A: DeepClone, B: DeepClone> DeepClone for (A, B) {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        Ok((self.0.clone_with(session)?, self.1.clone_with(session)?))
    }
}

impl<A: DeepClone, B: DeepClone, C: DeepClone> DeepClone for (A, B, C) {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        Ok((
            self.0.clone_with(session)?,
            self.1.clone_with(session)?,
            self.2.clone_with(session)?,
        ))
    }
}

impl<K, V, S> DeepClone for HashMap<K, V, S>
where
    K: DeepClone + Eq + Hash,
    V: DeepClone,
    S: BuildHasher + Default,
{
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        let mut out = HashMap::with_capacity_and_hasher(self.len(), S::default());
        for (k, v) in self {
            out.insert(k.clone_with(session)?, v.clone_with(session)?);
        }
        Ok(out)
    }
}

impl<K: DeepClone + Ord, V: DeepClone> DeepClone for BTreeMap<K, V> {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Self> {
        let mut out = BTreeMap::new();
        for (k, v) in self {
            out.insert(k.clone_with(session)?, v.clone_with(session)?);
        }
        Ok(out)
    }
}
