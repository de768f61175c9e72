//! The registry mapping `(name, version)` to [`Method`] (§3.6).

use std::collections::BTreeMap;

use semver::Version;

use crate::method::Method;

/// Name → versions registered for that name, in registration order.
///
/// `retired` holds methods removed by [`Methodology::deprecate`]: §4.4.9
/// requires that "existing agents bound to it continue to run" after
/// deprecation, and the interpreter re-resolves an agent's bound method from
/// here on every step (it holds a `name`+`version` binding, not a borrowed
/// `&Method` — §9 REDESIGN FLAGS' arena-index substitute for the cyclic
/// agent↔method reference), so a deprecated method can't simply vanish out
/// from under a running agent. `find`/`find_latest` — the "future lookups"
/// spec §4.4.9 says should fail — never consult `retired`; only
/// [`Methodology::resolve_bound`] does.
#[derive(Debug, Default)]
pub struct Methodology {
	methods: BTreeMap<String, Vec<Method>>,
	retired: BTreeMap<(String, Version), Method>,
}

impl Methodology {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `method` under its own `(name, version)`. Replaces any
	/// previously-registered method with the same name and version.
	pub fn register(&mut self, method: Method) {
		let versions = self.methods.entry(method.name().to_owned()).or_default();
		if let Some(existing) = versions.iter_mut().find(|existing| existing.version() == method.version()) {
			*existing = method;
		} else {
			versions.push(method);
		}
	}

	/// Exact-version lookup.
	#[must_use]
	pub fn find(&self, name: &str, version: &Version) -> Option<&Method> {
		self.methods.get(name)?.iter().find(|method| method.version() == version)
	}

	/// Looks up the registered version with the highest semver for `name`.
	#[must_use]
	pub fn find_latest(&self, name: &str) -> Option<&Method> {
		self.methods.get(name)?.iter().max_by_key(|method| method.version().clone())
	}

	/// Resolves `(name, version)` for an agent already bound to it, falling
	/// back to `retired` if the method has since been deprecated. This is the
	/// only lookup that sees `retired` entries (§4.4.9).
	#[must_use]
	pub fn resolve_bound(&self, name: &str, version: &Version) -> Option<&Method> {
		self.find(name, version).or_else(|| self.retired.get(&(name.to_owned(), version.clone())))
	}

	/// Removes the `(name, version)` entry from the set `find`/`find_latest`
	/// see, moving it into `retired` rather than dropping it outright: agents
	/// already bound to it keep running (§4.4.9), resolved through
	/// `resolve_bound`. Returns `true` if a method was actually removed.
	pub fn deprecate(&mut self, name: &str, version: &Version) -> bool {
		let Some(versions) = self.methods.get_mut(name) else {
			return false;
		};
		let Some(position) = versions.iter().position(|method| method.version() == version) else {
			return false;
		};
		let removed = versions.remove(position);
		if versions.is_empty() {
			self.methods.remove(name);
		}
		self.retired.insert((name.to_owned(), version.clone()), removed);
		true
	}

	/// All `(name, version, source)` triples, in a stable order, for persistence.
	pub fn all_methods(&self) -> impl Iterator<Item = &Method> {
		self.methods.values().flatten()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::log::Log;
	use crate::method::compile_method;

	fn method(name: &str, version: &str) -> Method {
		let log = Log::new();
		compile_method(name, &version.parse().unwrap(), "send(0, message)\n", &log).expect("valid method")
	}

	#[test]
	fn exact_lookup_finds_registered_version() {
		let mut methodology = Methodology::new();
		methodology.register(method("echo", "1.0.0"));
		let found = methodology.find("echo", &"1.0.0".parse().unwrap()).expect("registered");
		assert_eq!(found.name(), "echo");
	}

	#[test]
	fn latest_picks_highest_semver() {
		let mut methodology = Methodology::new();
		methodology.register(method("echo", "1.0.0"));
		methodology.register(method("echo", "2.1.0"));
		methodology.register(method("echo", "1.9.0"));
		let latest = methodology.find_latest("echo").expect("registered");
		assert_eq!(latest.version(), &"2.1.0".parse().unwrap());
	}

	#[test]
	fn deprecate_removes_only_future_lookups() {
		let mut methodology = Methodology::new();
		methodology.register(method("echo", "1.0.0"));
		assert!(methodology.deprecate("echo", &"1.0.0".parse().unwrap()));
		assert!(methodology.find("echo", &"1.0.0".parse().unwrap()).is_none());
		assert!(!methodology.deprecate("echo", &"1.0.0".parse().unwrap()));
	}

	#[test]
	fn resolve_bound_still_finds_a_deprecated_method() {
		let mut methodology = Methodology::new();
		methodology.register(method("echo", "1.0.0"));
		assert!(methodology.deprecate("echo", &"1.0.0".parse().unwrap()));
		assert!(methodology.find("echo", &"1.0.0".parse().unwrap()).is_none(), "future lookups must fail");
		assert!(methodology.resolve_bound("echo", &"1.0.0".parse().unwrap()).is_some(), "already-bound agents must still resolve it");
	}
}
