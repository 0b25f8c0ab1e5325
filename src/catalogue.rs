//! The fixed catalogue of hooks injected into a SQLite amalgamation.
//!
//! Anchors follow the text of the 3.45 amalgamation. Each literal anchor is
//! automatically followed by a whitespace-tolerant variant of itself; hand-written
//! context patterns cover drift that whitespace alone doesn't explain.

use crate::error::Error;
use crate::matcher::MatchStrategy;

pub const DEFAULT_GUARD: &str = "EMSCRIPTEN";

/// One instrumentation hook: where it goes, what is inserted, and how to tell it
/// is already there.
#[derive(Debug, Clone)]
pub struct AnchorSpec {
    pub name: &'static str,
    pub strategies: Vec<MatchStrategy>,
    pub fragment: String,
    pub marker: &'static str,
    /// Call-site text written by older instrumenters that also means the hook
    /// is installed.
    pub legacy_markers: &'static [&'static str],
    /// Hooks whose anchor legitimately disappears on some upstream versions.
    pub optional: bool,
}

/// The ordered, immutable set of specs applied by a run.
#[derive(Debug, Clone)]
pub struct Catalogue {
    specs: Vec<AnchorSpec>,
}

impl AnchorSpec {
    /// Whether `text` already carries this hook, in current or legacy form.
    pub fn is_present_in(&self, text: &str) -> bool {
        text.contains(self.marker) || self.legacy_markers.iter().any(|m| text.contains(m))
    }
}

impl Catalogue {
    /// Build the built-in catalogue with every fragment guarded by `guard`.
    pub fn builtin(guard: &str) -> Result<Self, Error> {
        if !is_c_identifier(guard) {
            return Err(Error::InvalidGuard(guard.to_string()));
        }
        let specs = HOOKS
            .iter()
            .map(|def| def.compile(guard))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Catalogue { specs })
    }

    pub fn specs(&self) -> &[AnchorSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&AnchorSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

enum StrategyDef {
    Literal {
        head: &'static str,
        tail: &'static str,
    },
    Context(&'static str),
}

struct HookDef {
    name: &'static str,
    strategies: &'static [StrategyDef],
    fragment: &'static str,
    marker: &'static str,
    legacy_markers: &'static [&'static str],
    optional: bool,
}

impl HookDef {
    fn compile(&self, guard: &str) -> Result<AnchorSpec, Error> {
        let invalid = |reason: String| Error::InvalidPattern {
            hook: self.name.to_string(),
            reason,
        };
        let mut strategies = Vec::with_capacity(self.strategies.len() * 2);
        for def in self.strategies {
            match def {
                StrategyDef::Literal { head, tail } => {
                    let literal = MatchStrategy::literal(*head, *tail);
                    let relaxed = literal
                        .relaxed()
                        .ok_or_else(|| invalid("literal has no relaxed form".into()))?
                        .map_err(invalid)?;
                    strategies.push(literal);
                    strategies.push(relaxed);
                }
                StrategyDef::Context(pattern) => {
                    strategies.push(MatchStrategy::context(pattern).map_err(invalid)?);
                }
            }
        }
        Ok(AnchorSpec {
            name: self.name,
            strategies,
            fragment: self.fragment.replace("{guard}", guard),
            marker: self.marker,
            legacy_markers: self.legacy_markers,
            optional: self.optional,
        })
    }
}

const HOOKS: &[HookDef] = &[
    HookDef {
        name: "declarations",
        strategies: &[
            StrategyDef::Literal {
                head: "",
                tail: "#ifndef SQLITE_AMALGAMATION",
            },
            StrategyDef::Literal {
                head: "",
                tail: "/*\n** Internal interface definitions for SQLite.",
            },
            StrategyDef::Literal {
                head: "#define SQLITE_AMALGAMATION 1\n",
                tail: "",
            },
        ],
        fragment: "\
/* ============================================================
** Visualization event hooks for B-tree and VDBE operations
** ============================================================ */
#ifdef {guard}
extern void page_allocate_event(int page_num, int page_type);
extern void page_free_event(int page_num);
extern void btree_insert_event(int page_num, int cell_idx, const char* key, int key_len);
extern void btree_delete_event(int page_num, int cell_idx);
extern void btree_split_event(int original_page, int new_page, int split_cell);
extern void btree_balance_event(int page_num, int num_cells);
extern void vdbe_start_event(int num_opcodes);
extern void vdbe_opcode_event(int pc, const char* opcode, int p1, int p2, int p3);
extern void vdbe_complete_event(int result_code);
#endif
/* ============================================================ */
",
        marker: "extern void page_allocate_event(int page_num, int page_type);",
        legacy_markers: &[],
        optional: false,
    },
    HookDef {
        name: "page-allocation",
        strategies: &[StrategyDef::Literal {
            head: "end_allocate_page:\n",
            tail: "  releasePage(pTrunk);\n  releasePage(pPrevTrunk);",
        }],
        fragment: "\
#ifdef {guard}
  if( rc==SQLITE_OK && *pPgno>1 ){
    page_allocate_event((int)*pPgno, 0);
  }
#endif
",
        marker: "page_allocate_event((int)*pPgno, 0);",
        legacy_markers: &[],
        optional: false,
    },
    HookDef {
        name: "page-deallocation",
        strategies: &[
            StrategyDef::Literal {
                head: "\
static int freePage2(BtShared *pBt, MemPage *pMemPage, Pgno iPage){
  MemPage *pTrunk = 0;                /* Free-list trunk page */
  Pgno iTrunk = 0;                    /* Page number of free-list trunk page */
  MemPage *pPage1 = pBt->pPage1;      /* Local reference to page 1 */
  MemPage *pPage;                     /* Page being freed. May be NULL. */
  int rc;                             /* Return Code */
  u32 nFree;                          /* Initial number of pages on free-list */
",
                tail: "",
            },
            // Signature, then up to 16 local declarations with any trailing comment.
            StrategyDef::Context(
                r"(?P<prefix>static\s+int\s+freePage2\(\s*BtShared\s*\*\s*pBt,\s*MemPage\s*\*\s*pMemPage,\s*Pgno\s+iPage\s*\)\s*\{[ \t]*\r?\n)(?P<anchor>(?:[ \t]*[A-Za-z_][A-Za-z0-9_]*[ \t]+\*?[ \t]*[A-Za-z_][A-Za-z0-9_]*(?:[ \t]*=[^;\n]*)?;[^\n]*\n){1,16})",
            ),
        ],
        fragment: "\
#ifdef {guard}
  if( iPage>1 ) page_free_event((int)iPage);
#endif
",
        marker: "page_free_event((int)iPage);",
        legacy_markers: &[],
        optional: false,
    },
    HookDef {
        name: "cell-insertion",
        strategies: &[StrategyDef::Literal {
            head: "  assert( iChild>0 );\n",
            tail: "  if( pPage->nOverflow || sz+2>pPage->nFree ){",
        }],
        fragment: "\
#ifdef {guard}
  btree_insert_event(pPage->pgno, i, (const char*)pCell, sz);
#endif
",
        marker: "btree_insert_event(pPage->pgno, i, (const char*)pCell, sz);",
        legacy_markers: &[],
        optional: false,
    },
    HookDef {
        name: "cell-deletion",
        strategies: &[StrategyDef::Literal {
            head: "  if( *pRC ) return;\n",
            tail: "  assert( idx>=0 );\n  assert( idx<pPage->nCell );",
        }],
        fragment: "\
#ifdef {guard}
  btree_delete_event(pPage->pgno, idx);
#endif
",
        marker: "btree_delete_event(pPage->pgno, idx);",
        legacy_markers: &[],
        optional: false,
    },
    HookDef {
        name: "page-balance",
        strategies: &[StrategyDef::Literal {
            head: "  memset(abDone, 0, sizeof(abDone));\n  memset(&b, 0, sizeof(b));\n  pBt = pParent->pBt;\n",
            tail: "",
        }],
        fragment: "\
#ifdef {guard}
  btree_balance_event(pParent->pgno, pParent->nCell);
#endif
",
        marker: "btree_balance_event(pParent->pgno, pParent->nCell);",
        legacy_markers: &[],
        optional: false,
    },
    HookDef {
        name: "page-split",
        // Sibling allocation inside balance_nonroot(); the hook runs once the
        // allocation is known to have succeeded. apOld[] is already zeroed by
        // then, so the original page is read from apNew[0].
        strategies: &[StrategyDef::Context(
            r"(?P<prefix>rc\s*=\s*allocateBtreePage\(\s*pBt,\s*&pNew,\s*&pgno,[^;\n]*;[ \t]*\r?\n)(?P<anchor>[ \t]*if\(\s*rc\s*\)\s*goto\s+balance_cleanup;[ \t]*\r?\n)",
        )],
        fragment: "\
#ifdef {guard}
      btree_split_event((int)apNew[0]->pgno, (int)pgno, i);
#endif
",
        marker: "btree_split_event((int)apNew[0]->pgno",
        legacy_markers: &["btree_split_event(apOld[0]->pgno, pgnoNew"],
        optional: true,
    },
    HookDef {
        name: "vdbe-start",
        strategies: &[StrategyDef::Literal {
            head: "  sqlite3EndBenignMalloc();\n#endif\n",
            tail: "  for(pOp=&aOp[p->pc]; 1; pOp++){",
        }],
        fragment: "\
#ifdef {guard}
  vdbe_start_event(p->nOp);
#endif
",
        marker: "vdbe_start_event(p->nOp);",
        legacy_markers: &[],
        optional: false,
    },
    HookDef {
        name: "vdbe-step",
        strategies: &[StrategyDef::Literal {
            head: "\
#ifdef SQLITE_DEBUG
    if( db->flags & SQLITE_VdbeTrace ){
      sqlite3VdbePrintOp(stdout, (int)(pOp - aOp), pOp);
      test_trace_breakpoint((int)(pOp - aOp),pOp,p);
    }
#endif
",
            tail: "",
        }],
        fragment: "\
#ifdef {guard}
    {
      extern const char *sqlite3OpcodeName(int);
      vdbe_opcode_event((int)(pOp - aOp), sqlite3OpcodeName(pOp->opcode),
                        pOp->p1, pOp->p2, pOp->p3);
    }
#endif
",
        marker: "vdbe_opcode_event((int)(pOp - aOp)",
        legacy_markers: &[],
        optional: false,
    },
    HookDef {
        name: "vdbe-complete",
        strategies: &[StrategyDef::Literal {
            head: "abort_due_to_error:\n",
            tail: "  if( db->mallocFailed ){\n    rc = SQLITE_NOMEM_BKPT;",
        }],
        fragment: "\
#ifdef {guard}
  vdbe_complete_event(rc);
#endif
",
        marker: "vdbe_complete_event(rc);",
        legacy_markers: &[],
        optional: false,
    },
];
