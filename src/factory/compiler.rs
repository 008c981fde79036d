//! Factory compiler
//!
//! Rewrites a description into a [`CompiledPlan`]: table and column
//! references are resolved against the environment's table provider, bind
//! arguments become "read slot i" accesses into the caller-supplied value
//! list, and everything else is baked in. Slot indices follow the same
//! pre-order the walker uses to collect bind values, so the two stay aligned.
//!
//! Compilation touches no I/O and no shared state; the cache decides what to
//! do with the result.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::environment::Environment;
use crate::factory::errors::CompileError;
use crate::factory::{ArgExpr, TemplateDescription};
use crate::schema::TableSchema;
use crate::template::{Substitution, TableToken, Template};

/// One substitution slot of the plan. Table indices point into the plan's
/// dense table list, not at factory parameter positions.
#[derive(Debug, Clone)]
enum SubstStep {
    Table(usize),
    Column { table: usize, column: String },
    Raw(String),
    Lit(Value),
    Slot(usize),
}

/// A specialized rendering plan for one description shape.
///
/// Applying the plan to the bind values captured at call time produces the
/// resolved [`Template`]. Plans are immutable and shared via the cache.
#[derive(Debug)]
pub(crate) struct CompiledPlan {
    skeleton: Arc<str>,
    steps: Vec<SubstStep>,
    tables: Vec<Arc<TableSchema>>,
}

impl CompiledPlan {
    /// Materialize a template from this call's bind values.
    ///
    /// Creates one fresh [`TableToken`] per distinct table parameter; every
    /// occurrence of that parameter shares the token, which is what makes a
    /// later alias declaration visible to all of them.
    pub(crate) fn apply(&self, binds: &[Value]) -> Template {
        let tokens: Vec<Arc<TableToken>> = self
            .tables
            .iter()
            .map(|schema| Arc::new(TableToken::new(schema.clone())))
            .collect();

        let substitutions = self
            .steps
            .iter()
            .map(|step| match step {
                SubstStep::Table(table) => Substitution::Table(tokens[*table].clone()),
                SubstStep::Column { table, column } => Substitution::Column {
                    table: tokens[*table].clone(),
                    column: column.clone(),
                },
                SubstStep::Raw(text) => Substitution::Raw(text.clone()),
                SubstStep::Lit(value) => Substitution::Value(value.clone()),
                // Slot indices are assigned by the same pre-order walk that
                // collected the binds, so a missing slot cannot happen for a
                // plan applied to its own walk output.
                SubstStep::Slot(slot) => {
                    Substitution::Value(binds.get(*slot).cloned().unwrap_or(Value::Null))
                }
            })
            .collect();

        Template::new(self.skeleton.clone(), substitutions)
    }
}

pub(crate) fn compile(
    description: &TemplateDescription,
    environment: &Environment,
) -> Result<CompiledPlan, CompileError> {
    let mut tables: Vec<Arc<TableSchema>> = Vec::new();
    let mut table_slots: HashMap<usize, usize> = HashMap::new();
    let mut steps = Vec::with_capacity(description.args().len());
    let mut next_slot = 0usize;

    for arg in description.args() {
        match *arg {
            ArgExpr::Table {
                param,
                ty,
                type_name,
            } => {
                let table = resolve_table(
                    &mut tables,
                    &mut table_slots,
                    param,
                    ty,
                    type_name,
                    environment,
                )?;
                steps.push(SubstStep::Table(table));
            }
            ArgExpr::Column {
                param,
                ty,
                type_name,
                member,
            } => {
                let table = resolve_table(
                    &mut tables,
                    &mut table_slots,
                    param,
                    ty,
                    type_name,
                    environment,
                )?;
                let column = tables[table]
                    .column_for_member(member)
                    .ok_or(CompileError::UnresolvableColumn { member, type_name })?;
                steps.push(SubstStep::Column {
                    table,
                    column: column.to_string(),
                });
            }
            ArgExpr::Raw(ref text) => steps.push(SubstStep::Raw(text.clone())),
            ArgExpr::Lit(ref value) => steps.push(SubstStep::Lit(value.clone())),
            ArgExpr::Bind(_) => {
                steps.push(SubstStep::Slot(next_slot));
                next_slot += 1;
            }
        }
    }

    Ok(CompiledPlan {
        skeleton: description.skeleton().into(),
        steps,
        tables,
    })
}

/// Resolve a table parameter once; later occurrences reuse the dense index.
fn resolve_table(
    tables: &mut Vec<Arc<TableSchema>>,
    table_slots: &mut HashMap<usize, usize>,
    param: usize,
    ty: TypeId,
    type_name: &'static str,
    environment: &Environment,
) -> Result<usize, CompileError> {
    if let Some(index) = table_slots.get(&param) {
        return Ok(*index);
    }

    let schema = environment
        .tables()
        .table_for(ty)
        .ok_or(CompileError::UnresolvableTable { type_name })?;

    let index = tables.len();
    tables.push(schema);
    table_slots.insert(param, index);
    Ok(index)
}
