use serde::Serialize;

/// Reachability of the two external dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub db: bool,
    pub llm: bool,
}

impl HealthStatus {
    pub fn all_up(&self) -> bool {
        self.db && self.llm
    }

    pub fn all_down(&self) -> bool {
        !self.db && !self.llm
    }

    pub fn db_label(&self) -> &'static str {
        ok_or_fail(self.db)
    }

    pub fn llm_label(&self) -> &'static str {
        ok_or_fail(self.llm)
    }
}

fn ok_or_fail(up: bool) -> &'static str {
    if up {
        "ok"
    } else {
        "fail"
    }
}
