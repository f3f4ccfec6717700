//! Name/value stores that placeholders are resolved against.

use std::collections::HashMap;
use tracing::warn;

/// The lookup store boundary: read a variable, or assign one.
///
/// Absent and empty values are treated identically by the expander, so an
/// implementation may return either for an unset name.
pub trait VarStore {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str);
}

impl VarStore for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.insert(name.to_owned(), value.to_owned());
    }
}

impl<S: VarStore + ?Sized> VarStore for &mut S {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: &str) {
        (**self).set(name, value);
    }
}

/// The real process environment.
///
/// Values that are not valid UTF-8 read as absent. Values containing NUL
/// cannot be stored and are dropped with a warning. Assignments mutate the
/// environment of the whole process; callers expanding from several threads
/// must serialize access themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl VarStore for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set(&mut self, name: &str, value: &str) {
        if value.contains('\0') {
            warn!(var = name, "value contains NUL, not exported to environment");
            return;
        }
        // SAFETY: no other thread may touch the environment concurrently;
        // that is the caller's contract, see the type docs.
        unsafe { std::env::set_var(name, value) }
    }
}

/// A private map layered over the (optionally inherited) process environment.
///
/// Reads check the map first. Writes only ever touch the map, so the real
/// environment is left alone.
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    vars: HashMap<String, String>,
    inherit: bool,
}

impl Overlay {
    /// An overlay that falls through to the process environment.
    pub fn inherited() -> Self {
        Self {
            vars: HashMap::new(),
            inherit: true,
        }
    }

    /// An overlay that sees nothing but its own entries.
    pub fn isolated() -> Self {
        Self::default()
    }

    pub fn extend<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl VarStore for Overlay {
    fn get(&self, name: &str) -> Option<String> {
        match self.vars.get(name) {
            Some(v) => Some(v.clone()),
            None if self.inherit => ProcessEnv.get(name),
            None => None,
        }
    }

    fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_owned(), value.to_owned());
    }
}
