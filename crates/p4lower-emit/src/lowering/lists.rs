use super::Lowering;
use crate::bits::byte_width;
use crate::conventions::field_instance;
use crate::error::Result;
use p4lower_core::{Expr, ExprKind, FieldRef, HeaderInstanceId};

/// Consecutive fields of one header instance, copied with a single `memcpy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRun {
    pub instance: HeaderInstanceId,
    /// Field indexes in declaration order, each one past the previous.
    pub fields: Vec<usize>,
}

/// Partitions field references into maximal runs of index-adjacent fields of the same instance.
pub fn group_adjacent_fields(refs: &[FieldRef]) -> Vec<FieldRun> {
    let mut runs: Vec<FieldRun> = Vec::new();
    for r in refs {
        match runs.last_mut() {
            Some(run)
                if run.instance == r.instance
                    && run.fields.last().map(|f| f + 1) == Some(r.field) =>
            {
                run.fields.push(r.field);
            }
            _ => runs.push(FieldRun {
                instance: r.instance,
                fields: vec![r.field],
            }),
        }
    }
    runs
}

/// A bit count known partly at generation time and partly only at run time.
#[derive(Debug, Default, Clone)]
struct BitSpan {
    fixed: u32,
    dynamic: Vec<String>,
}

impl BitSpan {
    fn add(&mut self, other: &BitSpan) {
        self.fixed += other.fixed;
        self.dynamic.extend(other.dynamic.iter().cloned());
    }

    fn bytes(&self) -> String {
        if self.dynamic.is_empty() {
            return byte_width(self.fixed).to_string();
        }
        let mut terms = Vec::with_capacity(self.dynamic.len() + 1);
        if self.fixed > 0 {
            terms.push(self.fixed.to_string());
        }
        terms.extend(self.dynamic.iter().cloned());
        format!("({}+7)/8", terms.join("+"))
    }
}

impl Lowering<'_> {
    /// Assembles the fields of a list expression into one byte buffer.
    pub(crate) fn list_buffer(&mut self, e: &Expr) -> Result<String> {
        let name = self.name_for("buffer", e.id);
        if self.mark_generated(e.id) {
            let code = self.assemble_list(e, &name)?;
            self.ctx.prepend(code);
        }
        Ok(format!(
            "(struct uint8_buffer_s) {{ .buffer = {0}, .buffer_size = {0}_size }}",
            name
        ))
    }

    fn assemble_list(&mut self, e: &Expr, name: &str) -> Result<String> {
        let ExprKind::List(items) = &e.kind else {
            return Ok(String::new());
        };

        let program = self.program;
        let mut refs = Vec::new();
        for item in items {
            let component = program.expr(*item)?;
            if let Some(field) = component.field_ref() {
                refs.push(field);
            } else if !component.is_constant() {
                self.warning(
                    "generating list expression buffer",
                    format!(
                        "Skipping not supported list element {}",
                        component.kind.node_name()
                    ),
                );
            }
        }

        let mut copies = Vec::new();
        let mut offset = BitSpan::default();
        for run in group_adjacent_fields(&refs) {
            let instance = program.header_instance(run.instance)?;
            let mut width = BitSpan::default();
            let mut first = None;
            for index in &run.fields {
                let field = program.field(FieldRef {
                    instance: run.instance,
                    field: *index,
                })?;
                let id = field_instance(&instance.name, &field.name);
                if field.is_varwidth() {
                    width
                        .dynamic
                        .push(format!("field_desc(pd, {}).bitwidth", id));
                } else {
                    width.fixed += field.size();
                }
                first.get_or_insert(id);
            }
            let Some(first) = first else { continue };

            copies.push(format!(
                "memcpy({} + {}, field_desc(pd, {}).byte_addr, {});",
                name,
                offset.bytes(),
                first,
                width.bytes()
            ));
            offset.add(&width);
        }

        let mut lines = vec![
            format!("int {}_size = {};", name, offset.bytes()),
            format!("uint8_t {0}[{0}_size];", name),
        ];
        lines.extend(copies);
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(instance: u32, field: usize) -> FieldRef {
        FieldRef {
            instance: HeaderInstanceId(instance),
            field,
        }
    }

    #[test]
    fn test_adjacent_fields_merge() {
        let runs = group_adjacent_fields(&[r(0, 1), r(0, 2), r(0, 3)]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].fields, vec![1, 2, 3]);
    }

    #[test]
    fn test_gaps_and_instances_split() {
        let runs = group_adjacent_fields(&[r(0, 1), r(0, 3), r(1, 4), r(0, 4)]);
        assert_eq!(runs.len(), 4);

        // Backwards order is not adjacency.
        let runs = group_adjacent_fields(&[r(0, 2), r(0, 1)]);
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_adjacent_fields(&[]).is_empty());
    }

    #[test]
    fn test_bit_span_bytes() {
        let mut span = BitSpan {
            fixed: 12,
            dynamic: Vec::new(),
        };
        assert_eq!(span.bytes(), "2");
        span.dynamic.push("field_desc(pd, f).bitwidth".into());
        assert_eq!(span.bytes(), "(12+field_desc(pd, f).bitwidth+7)/8");
    }
}
