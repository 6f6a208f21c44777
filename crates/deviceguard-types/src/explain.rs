//! Explain registry for checks and codes.
//!
//! Maps check IDs and evidence codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a check or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the check/code.
    pub title: &'static str,
    /// What the check looks at and why it matters.
    pub description: &'static str,
    /// What the host application (or the device owner) can do about it.
    pub remediation: &'static str,
}

/// Look up an explanation by check_id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        // Check IDs
        ids::CHECK_INTEGRITY_ROOT => Some(explain_root()),
        ids::CHECK_INTEGRITY_TAMPER => Some(explain_tamper()),
        ids::CHECK_INTEGRITY_EMULATOR => Some(explain_emulator()),
        ids::CHECK_INTEGRITY_DEBUGGER => Some(explain_debugger()),

        // Codes
        ids::CODE_ROOT_BINARY_PRESENT => Some(explain_root_binary_present()),
        ids::CODE_ROOT_PACKAGE_INSTALLED => Some(explain_root_package_installed()),
        ids::CODE_PRIVILEGED_SHELL_INVOKED => Some(explain_privileged_shell_invoked()),
        ids::CODE_TEST_KEYS_BUILD => Some(explain_test_keys_build()),
        ids::CODE_SIGNATURE_MISMATCH => Some(explain_signature_mismatch()),
        ids::CODE_SIGNATURE_UNVERIFIABLE => Some(explain_signature_unverifiable()),
        ids::CODE_EMULATOR_BUILD_SIGNATURE => Some(explain_emulator_build_signature()),
        ids::CODE_DEBUGGER_ATTACHED => Some(explain_debugger_attached()),

        _ => None,
    }
}

/// List all known check IDs.
pub fn all_check_ids() -> &'static [&'static str] {
    &[
        ids::CHECK_INTEGRITY_ROOT,
        ids::CHECK_INTEGRITY_TAMPER,
        ids::CHECK_INTEGRITY_EMULATOR,
        ids::CHECK_INTEGRITY_DEBUGGER,
    ]
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_ROOT_BINARY_PRESENT,
        ids::CODE_ROOT_PACKAGE_INSTALLED,
        ids::CODE_PRIVILEGED_SHELL_INVOKED,
        ids::CODE_TEST_KEYS_BUILD,
        ids::CODE_SIGNATURE_MISMATCH,
        ids::CODE_SIGNATURE_UNVERIFIABLE,
        ids::CODE_EMULATOR_BUILD_SIGNATURE,
        ids::CODE_DEBUGGER_ATTACHED,
    ]
}

// --- Check-level explanations ---

fn explain_root() -> Explanation {
    Explanation {
        title: "Root Access",
        description: "\
Detects whether the device has been rooted. Four independent signals are tried in order and
the first positive one wins:
- a known root-broker binary (e.g. `/system/xbin/su`) exists
- a known root-management app (e.g. `com.topjohnwu.magisk`) is installed
- the privileged-elevation command (`su` by default) can be invoked
- the OS build carries the `test-keys` tag

A failed probe counts as \"no evidence\" for that signal.",
        remediation: "\
A rooted device lets any app read or modify this application's private data and memory.
Typical product responses are to refuse to store secrets, require re-authentication, or
block sensitive flows. Extend the denylists in `deviceguard.toml` under `[root]` as new
root tooling appears.",
    }
}

fn explain_tamper() -> Explanation {
    Explanation {
        title: "Binary Tamper",
        description: "\
Compares the running application's own signing identity with the expected signature from
configuration. A mismatch means the package was re-signed, which usually means it was
repackaged.

This check fails closed: if the signature cannot be read at all, the application is treated
as tampered.",
        remediation: "\
Make sure `expected_signature` matches the release signing certificate (either the raw bytes
as hex or `sha256:<digest>`). A genuine mismatch in the field means the installed build did
not come from you and should not be trusted with credentials.",
    }
}

fn explain_emulator() -> Explanation {
    Explanation {
        title: "Emulator",
        description: "\
Matches the OS build fingerprint, model, manufacturer, brand and device strings against known
emulator and virtualization signatures (generic fingerprints, SDK model strings, Genymotion).
Brand and device must both start with `generic` for that rule to fire; either alone is too
weak a signal.",
        remediation: "\
Emulators are common during development and automated testing. Production responses usually
warn or rate-limit rather than block.",
    }
}

fn explain_debugger() -> Explanation {
    Explanation {
        title: "Debugger Attached",
        description: "\
Reads the OS-level \"debugger attached\" signal for the current process.",
        remediation: "\
An attached debugger can inspect and alter process memory. Release builds should treat this
as a hostile environment; debug builds will routinely report it.",
    }
}

// --- Code-level explanations ---

fn explain_root_binary_present() -> Explanation {
    Explanation {
        title: "Root Binary Present",
        description: "\
A path from the root-binary denylist exists on the device (for example `/sbin/su` or
`/system/app/Superuser.apk`).",
        remediation: "\
The detail field names the matched path. Nothing short of unrooting the device clears this.",
    }
}

fn explain_root_package_installed() -> Explanation {
    Explanation {
        title: "Root Manager Installed",
        description: "\
A package identifier from the root-manager denylist resolves on the device (for example
`eu.chainfire.supersu` or `com.topjohnwu.magisk`).",
        remediation: "\
The detail field names the package. Uninstalling the manager alone does not necessarily
remove root access.",
    }
}

fn explain_privileged_shell_invoked() -> Explanation {
    Explanation {
        title: "Privileged Shell Invoked",
        description: "\
The privileged-elevation command could be started. The spawned process is terminated
immediately; its output is never read.

Known limitation: successful invocation is treated as evidence of root even when elevation
itself would have been denied.",
        remediation: "\
If this is the only positive root signal, confirm by hand before acting on it.",
    }
}

fn explain_test_keys_build() -> Explanation {
    Explanation {
        title: "Test-Keys Build",
        description: "\
The OS build tags contain `test-keys`, which marks a custom or non-retail firmware signed with
development keys.",
        remediation: "\
Retail firmware is signed with `release-keys`. Custom ROMs are not necessarily rooted, but
they carry no vendor integrity guarantees.",
    }
}

fn explain_signature_mismatch() -> Explanation {
    Explanation {
        title: "Signature Mismatch",
        description: "\
The application's signing identity was read successfully but differs from
`expected_signature`.",
        remediation: "\
Check the configured value first (a debug-signed build will always mismatch a release
signature). Otherwise the installed package has been re-signed by someone else.",
    }
}

fn explain_signature_unverifiable() -> Explanation {
    Explanation {
        title: "Signature Unverifiable",
        description: "\
The application's signing identity could not be read (provider unavailable, signature
absent or malformed). Inability to verify is reported as tampered.",
        remediation: "\
Inspect the host platform integration that supplies the signature. This is never reported
as safe.",
    }
}

fn explain_emulator_build_signature() -> Explanation {
    Explanation {
        title: "Emulator Build Signature",
        description: "\
One of the emulator rules matched the device build metadata. The detail field names the rule.",
        remediation: "\
Expected on development machines and CI device farms.",
    }
}

fn explain_debugger_attached() -> Explanation {
    Explanation {
        title: "Debugger Attached",
        description: "\
The operating system reports a debugger attached to the application process.",
        remediation: "\
Detach the debugger, or run a release build.",
    }
}
