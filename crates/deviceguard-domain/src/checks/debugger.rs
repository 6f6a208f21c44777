use crate::model::{Evidence, Indicator};
use crate::probe::DebugProbe;
use deviceguard_types::{Category, ids};

pub fn detect_debugger(dbg: &dyn DebugProbe) -> Indicator {
    if dbg.is_debugger_attached() {
        tracing::debug!("debugger attached");
        Indicator::present(
            Category::Debugger,
            Evidence::new(ids::CODE_DEBUGGER_ATTACHED, "debugger attached to process"),
        )
    } else {
        Indicator::absent(Category::Debugger)
    }
}
