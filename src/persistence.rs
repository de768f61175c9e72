//! On-disk persistence for methods and agents (§6.3).
//!
//! Two `.agerun`-suffixed text files. Each save is written "backup existing,
//! write temp, fsync, rename, remove backup" so a crash mid-write leaves
//! either the old file or the new one intact, never a half-written one; each
//! load that detects corruption (an unknown type tag, or a byte count that
//! runs past the end of the file) restores the `.bak` companion and retries
//! once before giving up.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::agent::{Agent, MethodBinding};
use crate::error::RuntimeError;
use crate::log::Log;
use crate::method::{compile_method, Method};
use crate::value::Value;

const BACKUP_EXTENSION: &str = "bak";
const TEMP_EXTENSION: &str = "tmp";

fn io_fail(error: io::Error) -> RuntimeError {
	RuntimeError::IoFailure(error.to_string())
}

fn corrupt(detail: impl Into<String>) -> RuntimeError {
	RuntimeError::PersistenceCorruption(detail.into())
}

fn sibling_path(path: &Path, extension: &str) -> PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push(".");
	name.push(extension);
	PathBuf::from(name)
}

/// Writes `contents` to `path` via the backup/temp/fsync/rename sequence
/// named in §6.3.
fn write_atomically(path: &Path, contents: &str) -> Result<(), RuntimeError> {
	let backup = sibling_path(path, BACKUP_EXTENSION);
	if path.exists() {
		fs::copy(path, &backup).map_err(io_fail)?;
	}
	let temp = sibling_path(path, TEMP_EXTENSION);
	fs::write(&temp, contents).map_err(io_fail)?;
	let file = fs::File::open(&temp).map_err(io_fail)?;
	file.sync_all().map_err(io_fail)?;
	fs::rename(&temp, path).map_err(io_fail)?;
	if backup.exists() {
		fs::remove_file(&backup).map_err(io_fail)?;
	}
	Ok(())
}

/// Copies `path`'s `.bak` companion back over it. Fails if no backup exists.
fn restore_backup(path: &Path) -> Result<(), RuntimeError> {
	let backup = sibling_path(path, BACKUP_EXTENSION);
	if !backup.exists() {
		return Err(corrupt(format!("{} is corrupt and no backup exists", path.display())));
	}
	fs::copy(&backup, path).map_err(io_fail)?;
	Ok(())
}

/// A byte-oriented cursor over a loaded file's contents. Plain line-based
/// reading can't be used throughout: method source and string values are
/// length-prefixed so they may contain embedded newlines.
struct Cursor<'bytes> {
	bytes: &'bytes [u8],
	position: usize,
}

impl<'bytes> Cursor<'bytes> {
	const fn new(bytes: &'bytes [u8]) -> Self {
		Self { bytes, position: 0 }
	}

	fn is_at_eof(&self) -> bool {
		self.position >= self.bytes.len()
	}

	/// Reads up to (not including) the next `\n`, advancing past it.
	fn read_line(&mut self) -> Option<String> {
		if self.is_at_eof() {
			return None;
		}
		let start = self.position;
		let end = self.bytes[start..].iter().position(|&byte| byte == b'\n').map_or(self.bytes.len(), |offset| start + offset);
		let line = String::from_utf8_lossy(&self.bytes[start..end]).into_owned();
		self.position = (end + 1).min(self.bytes.len());
		Some(line)
	}

	/// Reads exactly `count` bytes without interpreting them.
	fn read_exact(&mut self, count: usize) -> Option<&'bytes [u8]> {
		let end = self.position.checked_add(count)?;
		if end > self.bytes.len() {
			return None;
		}
		let slice = &self.bytes[self.position..end];
		self.position = end;
		Some(slice)
	}

	/// Consumes one `\n` if the cursor sits on one; used after a length-prefixed
	/// blob to land back on a line boundary.
	fn skip_newline(&mut self) {
		if self.bytes.get(self.position) == Some(&b'\n') {
			self.position += 1;
		}
	}
}

/// Writes every method to `path`, in the order `methods` yields them, so a
/// later version's replay sees any earlier version it was registered after
/// (§6.3: "earlier versions exist before later ones that reference them").
///
/// # Errors
/// Returns [`RuntimeError::IoFailure`] if the write fails.
pub fn save_methods<'methods>(path: impl AsRef<Path>, methods: impl Iterator<Item = &'methods Method>) -> Result<(), RuntimeError> {
	let mut out = String::new();
	for method in methods {
		let source = method.source();
		out.push_str(&format!("METHOD {} {}\n{}\n{source}\n", method.name(), method.version(), source.len()));
	}
	write_atomically(path.as_ref(), &out)
}

/// Loads every method record from `path`, restoring from `.bak` and retrying
/// once if the file is corrupt. A missing file is not an error: it means
/// nothing has been saved yet.
///
/// # Errors
/// Returns [`RuntimeError::PersistenceCorruption`] if the file (and its
/// backup) are both unreadable, or [`RuntimeError::IoFailure`] for an
/// underlying I/O failure.
pub fn load_methods(path: impl AsRef<Path>, log: &Log) -> Result<Vec<Method>, RuntimeError> {
	let path = path.as_ref();
	if !path.exists() {
		return Ok(Vec::new());
	}
	match parse_methods_file(path, log) {
		Ok(methods) => Ok(methods),
		Err(RuntimeError::PersistenceCorruption(_)) => {
			restore_backup(path)?;
			parse_methods_file(path, log)
		},
		Err(other) => Err(other),
	}
}

fn parse_methods_file(path: &Path, log: &Log) -> Result<Vec<Method>, RuntimeError> {
	let bytes = fs::read(path).map_err(io_fail)?;
	let mut cursor = Cursor::new(&bytes);
	let mut methods = Vec::new();

	while !cursor.is_at_eof() {
		let header = cursor.read_line().ok_or_else(|| corrupt("truncated method header"))?;
		if header.is_empty() {
			continue;
		}
		let mut parts = header.splitn(3, ' ');
		let tag = parts.next().unwrap_or_default();
		if tag != "METHOD" {
			return Err(corrupt(format!("unknown record tag '{tag}'")));
		}
		let name = parts.next().ok_or_else(|| corrupt("missing method name"))?;
		let version_text = parts.next().ok_or_else(|| corrupt("missing method version"))?;
		let version: Version = version_text.parse().map_err(|_| corrupt(format!("invalid version '{version_text}'")))?;

		let count_line = cursor.read_line().ok_or_else(|| corrupt("missing source byte count"))?;
		let byte_count: usize = count_line.trim().parse().map_err(|_| corrupt(format!("invalid byte count '{count_line}'")))?;
		let source_bytes = cursor.read_exact(byte_count).ok_or_else(|| corrupt("source shorter than declared byte count"))?;
		let source = std::str::from_utf8(source_bytes).map_err(|_| corrupt("source is not valid UTF-8"))?.to_owned();
		cursor.skip_newline();

		let method = compile_method(name, &version, &source, log).ok_or_else(|| corrupt(format!("method '{name}' v{version} failed to compile")))?;
		methods.push(method);
	}
	Ok(methods)
}

/// Serializes `map`'s entries under a leading entry count, recursing into
/// nested maps. `List` values have no persisted tag (§6.3 names only
/// `I`/`D`/`S`/`M`) and are silently dropped rather than written as an
/// unreadable record.
fn write_map(out: &mut String, map: &BTreeMap<String, Value>) {
	let persisted: Vec<_> = map.iter().filter(|(_, value)| !matches!(value, Value::List(_))).collect();
	out.push_str(&format!("{}\n", persisted.len()));
	for (key, value) in persisted {
		match value {
			Value::Integer(integer) => out.push_str(&format!("I {key} {integer}\n")),
			Value::Double(double) => out.push_str(&format!("D {key} {double}\n")),
			Value::String(text) => {
				out.push_str(&format!("S {key} {}\n{text}\n", text.len()));
			},
			Value::Map(nested) => {
				out.push_str(&format!("M {key}\n"));
				write_map(out, nested);
			},
			Value::List(_) => unreachable!("filtered out above"),
		}
	}
}

fn read_map(cursor: &mut Cursor<'_>) -> Result<BTreeMap<String, Value>, RuntimeError> {
	let count_line = cursor.read_line().ok_or_else(|| corrupt("missing map entry count"))?;
	let count: usize = count_line.trim().parse().map_err(|_| corrupt(format!("invalid map entry count '{count_line}'")))?;

	let mut map = BTreeMap::new();
	for _ in 0..count {
		let line = cursor.read_line().ok_or_else(|| corrupt("truncated map entry"))?;
		let mut parts = line.splitn(3, ' ');
		let tag = parts.next().unwrap_or_default();
		let key = parts.next().ok_or_else(|| corrupt("missing map entry key"))?.to_owned();
		match tag {
			"I" => {
				let raw = parts.next().ok_or_else(|| corrupt("missing integer value"))?;
				let integer: i64 = raw.parse().map_err(|_| corrupt(format!("invalid integer '{raw}'")))?;
				map.insert(key, Value::Integer(integer));
			},
			"D" => {
				let raw = parts.next().ok_or_else(|| corrupt("missing double value"))?;
				let double: f64 = raw.parse().map_err(|_| corrupt(format!("invalid double '{raw}'")))?;
				map.insert(key, Value::Double(double));
			},
			"S" => {
				let raw = parts.next().ok_or_else(|| corrupt("missing string byte count"))?;
				let byte_count: usize = raw.parse().map_err(|_| corrupt(format!("invalid string byte count '{raw}'")))?;
				let bytes = cursor.read_exact(byte_count).ok_or_else(|| corrupt("string shorter than declared byte count"))?;
				let text = std::str::from_utf8(bytes).map_err(|_| corrupt("string is not valid UTF-8"))?.to_owned();
				cursor.skip_newline();
				map.insert(key, Value::String(text));
			},
			"M" => {
				let nested = read_map(cursor)?;
				map.insert(key, Value::Map(nested));
			},
			other => return Err(corrupt(format!("unknown type tag '{other}'"))),
		}
	}
	Ok(map)
}

/// Writes every persistent agent in `agents` to `path`; non-persistent
/// agents are skipped since nothing will ever reload them.
///
/// # Errors
/// Returns [`RuntimeError::IoFailure`] if the write fails.
pub fn save_agents<'agents>(path: impl AsRef<Path>, agents: impl Iterator<Item = &'agents Agent>) -> Result<(), RuntimeError> {
	let mut out = String::new();
	for agent in agents {
		if !agent.is_persistent() {
			continue;
		}
		let binding = agent.method();
		out.push_str(&format!("AGENT {} {} {}\n", agent.id(), binding.name, binding.version));

		let Value::Map(memory) = agent.memory() else { unreachable!("agent memory is always a Map") };
		out.push_str("MEMORY\n");
		write_map(&mut out, memory);

		let Value::Map(context) = agent.context() else { unreachable!("agent context is always a Map") };
		out.push_str("CONTEXT\n");
		write_map(&mut out, context);
	}
	write_atomically(path.as_ref(), &out)
}

/// Loads every persisted agent from `path`, restoring from `.bak` and
/// retrying once if the file is corrupt. A missing file yields no agents.
///
/// # Errors
/// Returns [`RuntimeError::PersistenceCorruption`] if the file (and its
/// backup) are both unreadable, or [`RuntimeError::IoFailure`] for an
/// underlying I/O failure.
pub fn load_agents(path: impl AsRef<Path>) -> Result<Vec<Agent>, RuntimeError> {
	let path = path.as_ref();
	if !path.exists() {
		return Ok(Vec::new());
	}
	match parse_agents_file(path) {
		Ok(agents) => Ok(agents),
		Err(RuntimeError::PersistenceCorruption(_)) => {
			restore_backup(path)?;
			parse_agents_file(path)
		},
		Err(other) => Err(other),
	}
}

fn parse_agents_file(path: &Path) -> Result<Vec<Agent>, RuntimeError> {
	let bytes = fs::read(path).map_err(io_fail)?;
	let mut cursor = Cursor::new(&bytes);
	let mut agents = Vec::new();

	while !cursor.is_at_eof() {
		let header = cursor.read_line().ok_or_else(|| corrupt("truncated agent header"))?;
		if header.is_empty() {
			continue;
		}
		let mut parts = header.splitn(4, ' ');
		let tag = parts.next().unwrap_or_default();
		if tag != "AGENT" {
			return Err(corrupt(format!("unknown record tag '{tag}'")));
		}
		let id_text = parts.next().ok_or_else(|| corrupt("missing agent id"))?;
		let id: i64 = id_text.parse().map_err(|_| corrupt(format!("invalid agent id '{id_text}'")))?;
		let name = parts.next().ok_or_else(|| corrupt("missing method name"))?.to_owned();
		let version_text = parts.next().ok_or_else(|| corrupt("missing method version"))?;
		let version: Version = version_text.parse().map_err(|_| corrupt(format!("invalid version '{version_text}'")))?;

		let memory_header = cursor.read_line().ok_or_else(|| corrupt("missing MEMORY header"))?;
		if memory_header != "MEMORY" {
			return Err(corrupt(format!("expected 'MEMORY', got '{memory_header}'")));
		}
		let memory = read_map(&mut cursor)?;

		let context_header = cursor.read_line().ok_or_else(|| corrupt("missing CONTEXT header"))?;
		if context_header != "CONTEXT" {
			return Err(corrupt(format!("expected 'CONTEXT', got '{context_header}'")));
		}
		let context = read_map(&mut cursor)?;

		agents.push(Agent::from_persisted(id, MethodBinding { name, version }, memory, context));
	}
	Ok(agents)
}
