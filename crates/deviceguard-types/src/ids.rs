//! Stable identifiers for checks and evidence codes.
//!
//! `check_id` is a dotted namespace, one per threat category. `code` is a short snake_case
//! discriminator naming the sub-check that produced the evidence.

// Checks
pub const CHECK_INTEGRITY_ROOT: &str = "integrity.root";
pub const CHECK_INTEGRITY_TAMPER: &str = "integrity.tamper";
pub const CHECK_INTEGRITY_EMULATOR: &str = "integrity.emulator";
pub const CHECK_INTEGRITY_DEBUGGER: &str = "integrity.debugger";

// Codes: integrity.root
pub const CODE_ROOT_BINARY_PRESENT: &str = "root_binary_present";
pub const CODE_ROOT_PACKAGE_INSTALLED: &str = "root_package_installed";
pub const CODE_PRIVILEGED_SHELL_INVOKED: &str = "privileged_shell_invoked";
pub const CODE_TEST_KEYS_BUILD: &str = "test_keys_build";

// Codes: integrity.tamper
pub const CODE_SIGNATURE_MISMATCH: &str = "signature_mismatch";
pub const CODE_SIGNATURE_UNVERIFIABLE: &str = "signature_unverifiable";

// Codes: integrity.emulator
pub const CODE_EMULATOR_BUILD_SIGNATURE: &str = "emulator_build_signature";

// Codes: integrity.debugger
pub const CODE_DEBUGGER_ATTACHED: &str = "debugger_attached";

// Tool-level
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";
