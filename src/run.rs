use serde::Serialize;

use crate::apply::{ApplyOutcome, apply};
use crate::buffer::SourceBuffer;
use crate::catalogue::Catalogue;

/// Outcome of one spec within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookResult {
    pub name: &'static str,
    #[serde(flatten)]
    pub outcome: ApplyOutcome,
    pub optional: bool,
}

/// Per-spec outcomes of a single run, in catalogue order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub hooks: Vec<HookResult>,
}

impl RunReport {
    fn record(mut self, result: HookResult) -> Self {
        self.hooks.push(result);
        self
    }

    pub fn outcome(&self, name: &str) -> Option<ApplyOutcome> {
        self.hooks
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.outcome)
    }

    pub fn applied(&self) -> usize {
        self.hooks.iter().filter(|h| h.outcome.is_applied()).count()
    }

    pub fn already_present(&self) -> usize {
        self.hooks
            .iter()
            .filter(|h| h.outcome == ApplyOutcome::AlreadyPresent)
            .count()
    }

    pub fn not_found(&self) -> usize {
        self.hooks
            .iter()
            .filter(|h| h.outcome == ApplyOutcome::NotFound)
            .count()
    }
}

/// Apply every spec of `catalogue`, in order, to `initial`.
///
/// Each spec sees the buffer produced by the ones before it. A spec that is not
/// found or already present never stops the run.
pub fn run(initial: SourceBuffer, catalogue: &Catalogue) -> (SourceBuffer, RunReport) {
    let (buffer, report) = catalogue.specs().iter().fold(
        (initial, RunReport::default()),
        |(buffer, report), spec| {
            let (next, outcome) = apply(buffer, spec);
            let report = report.record(HookResult {
                name: spec.name,
                outcome,
                optional: spec.optional,
            });
            (next, report)
        },
    );

    if report.outcome("declarations") == Some(ApplyOutcome::NotFound) {
        tracing::warn!(
            "hook declarations were not inserted; the instrumented file will not \
             compile with the guard macro defined unless they are provided elsewhere"
        );
    }

    tracing::debug!(
        applied = report.applied(),
        already_present = report.already_present(),
        not_found = report.not_found(),
        "run finished"
    );
    (buffer, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::DEFAULT_GUARD;

    const FIXTURE: &str = include_str!("../tests/fixtures/sqlite3_excerpt.c");

    fn catalogue() -> Catalogue {
        Catalogue::builtin(DEFAULT_GUARD).unwrap()
    }

    #[test]
    fn applies_every_hook_to_the_fixture() {
        let (output, report) = run(SourceBuffer::from(FIXTURE), &catalogue());
        for hook in &report.hooks {
            assert_eq!(
                hook.outcome,
                ApplyOutcome::Applied { strategy: 0 },
                "{} did not apply via its primary strategy",
                hook.name
            );
        }
        assert_eq!(report.applied(), 10);

        let added: usize = catalogue().specs().iter().map(|s| s.fragment.len()).sum();
        assert_eq!(output.len(), FIXTURE.len() + added);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let catalogue = catalogue();
        let (first, _) = run(SourceBuffer::from(FIXTURE), &catalogue);
        let (second, report) = run(first.clone(), &catalogue);
        assert_eq!(report.applied(), 0);
        assert_eq!(report.already_present(), catalogue.len());
        assert_eq!(second, first);
    }

    #[test]
    fn one_missing_anchor_only_affects_its_hook() {
        let renamed = FIXTURE.replace("abort_due_to_error:", "abort_on_error:");
        let (_, report) = run(SourceBuffer::from(renamed), &catalogue());
        assert_eq!(report.outcome("vdbe-complete"), Some(ApplyOutcome::NotFound));
        assert_eq!(report.not_found(), 1);
        assert_eq!(report.applied(), 9);
    }

    #[test]
    fn hooks_still_apply_without_declaration_landmarks() {
        let stripped = FIXTURE
            .replace("#ifndef SQLITE_AMALGAMATION", "#ifndef SQLITE_OTHER")
            .replace("#define SQLITE_AMALGAMATION 1", "#define SQLITE_OTHER 1")
            .replace("Internal interface definitions", "Interface definitions");
        let (_, report) = run(SourceBuffer::from(stripped), &catalogue());
        assert_eq!(report.outcome("declarations"), Some(ApplyOutcome::NotFound));
        assert_eq!(report.applied(), 9);
    }

    #[test]
    fn free_page_context_pattern_survives_comment_drift() {
        let drifted = FIXTURE.replace("/* Free-list trunk page */", "/* Trunk of the free-list */");
        let (output, report) = run(SourceBuffer::from(drifted), &catalogue());
        assert_eq!(
            report.outcome("page-deallocation"),
            Some(ApplyOutcome::Applied { strategy: 2 })
        );
        assert!(output.as_str().contains(
            "/* Initial number of pages on free-list */\n\
             #ifdef EMSCRIPTEN\n  if( iPage>1 ) page_free_event((int)iPage);\n"
        ));
    }

    #[test]
    fn declarations_fall_back_to_the_amalgamation_define() {
        let stripped = FIXTURE.replace("#ifndef SQLITE_AMALGAMATION\n", "#ifndef SQLITE_OTHER\n");
        let (output, report) = run(SourceBuffer::from(stripped), &catalogue());
        assert_eq!(
            report.outcome("declarations"),
            Some(ApplyOutcome::Applied { strategy: 4 })
        );
        assert!(output.as_str().contains(
            "#define SQLITE_AMALGAMATION 1\n/* ============================================================\n"
        ));
    }

    #[test]
    fn header_comment_landmark_wins_over_the_amalgamation_define() {
        let with_header = FIXTURE
            .replace("#ifndef SQLITE_AMALGAMATION\n", "#ifndef SQLITE_OTHER\n")
            .replace(
                "#ifndef SQLITEINT_H\n",
                "/*\n** Internal interface definitions for SQLite.\n*/\n#ifndef SQLITEINT_H\n",
            );
        let (output, report) = run(SourceBuffer::from(with_header), &catalogue());
        assert_eq!(
            report.outcome("declarations"),
            Some(ApplyOutcome::Applied { strategy: 2 })
        );
        let text = output.as_str();
        let decl = text.find("extern void page_allocate_event").unwrap();
        let header = text.find("/*\n** Internal interface definitions").unwrap();
        let define = text.find("#define SQLITE_AMALGAMATION 1\n").unwrap();
        assert!(define < decl && decl < header);
    }

    #[test]
    fn no_anchors_means_all_not_found_and_identical_output() {
        let input = SourceBuffer::from("int main(void){ return 0; }\n");
        let (output, report) = run(input.clone(), &catalogue());
        assert_eq!(output, input);
        assert_eq!(report.not_found(), catalogue().len());
        assert_eq!(report.applied(), 0);
    }

    #[test]
    fn declarations_land_before_the_first_landmark() {
        let (output, _) = run(SourceBuffer::from(FIXTURE), &catalogue());
        let decl = output
            .as_str()
            .find("extern void page_allocate_event")
            .unwrap();
        let guard = output.as_str().find("#ifndef SQLITE_AMALGAMATION").unwrap();
        assert!(decl < guard);
    }

    #[test]
    fn report_serializes_outcomes() {
        let (_, report) = run(SourceBuffer::from("nothing"), &catalogue());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["hooks"][0]["name"], "declarations");
        assert_eq!(json["hooks"][0]["outcome"], "not-found");
        assert_eq!(json["hooks"][6]["optional"], true);
    }
}
