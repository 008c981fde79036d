//! Template factories
//!
//! A template factory is a closure that receives [`TableParam`] handles and
//! returns a [`TemplateDescription`]: the literal skeleton plus an ordered
//! list of argument expressions. The description is the factory's computation
//! graph - the walker fingerprints it, the compiler specializes it, and the
//! cache shares the compiled plan across structurally identical descriptions.

pub mod cache;
pub(crate) mod compiler;
pub mod errors;
pub(crate) mod walker;

use std::any::TypeId;
use std::marker::PhantomData;

use serde_json::Value;

use crate::schema::Table;

/// Handle standing for one table parameter of a factory.
pub struct TableParam<T: Table> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Table> Clone for TableParam<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Table> Copy for TableParam<T> {}

impl<T: Table> TableParam<T> {
    pub(crate) fn new(index: usize) -> Self {
        TableParam {
            index,
            _marker: PhantomData,
        }
    }

    /// Reference a declared member of this table.
    pub fn col(self, member: &'static str) -> ColumnParam {
        ColumnParam {
            param: self.index,
            ty: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            member,
        }
    }
}

/// A member access on a table parameter, resolved to a column at compile time.
#[derive(Debug, Clone, Copy)]
pub struct ColumnParam {
    param: usize,
    ty: TypeId,
    type_name: &'static str,
    member: &'static str,
}

/// One argument expression of a description.
///
/// `Table`, `Column`, `Raw` and `Lit` are identity-relevant: they are part of
/// the structural shape and get baked into the compiled plan. `Bind` is an
/// opaque runtime value - its presence is part of the shape, its value is not.
#[derive(Debug, Clone)]
pub(crate) enum ArgExpr {
    Table {
        param: usize,
        ty: TypeId,
        type_name: &'static str,
    },
    Column {
        param: usize,
        ty: TypeId,
        type_name: &'static str,
        member: &'static str,
    },
    Raw(String),
    Lit(Value),
    Bind(Value),
}

/// A template factory's output: skeleton text plus argument expressions.
///
/// Placeholder indices in the skeleton are 0-based positions into the
/// argument list, in the order the `table`/`column`/`raw`/`lit`/`bind`
/// calls were made.
#[derive(Debug, Clone)]
pub struct TemplateDescription {
    skeleton: String,
    args: Vec<ArgExpr>,
}

impl TemplateDescription {
    pub fn new(skeleton: impl Into<String>) -> Self {
        TemplateDescription {
            skeleton: skeleton.into(),
            args: Vec::new(),
        }
    }

    /// Append a table reference argument.
    pub fn table<T: Table>(mut self, param: TableParam<T>) -> Self {
        self.args.push(ArgExpr::Table {
            param: param.index,
            ty: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        });
        self
    }

    /// Append a column reference argument.
    pub fn column(mut self, column: ColumnParam) -> Self {
        self.args.push(ArgExpr::Column {
            param: column.param,
            ty: column.ty,
            type_name: column.type_name,
            member: column.member,
        });
        self
    }

    /// Append a raw SQL fragment, inserted verbatim with no escaping.
    pub fn raw(mut self, sql: impl Into<String>) -> Self {
        self.args.push(ArgExpr::Raw(sql.into()));
        self
    }

    /// Append an inline literal. The value is part of the structural shape:
    /// two descriptions differing only in a `lit` value compile separately.
    pub fn lit(mut self, value: impl Into<Value>) -> Self {
        self.args.push(ArgExpr::Lit(value.into()));
        self
    }

    /// Append a runtime bind value. Only the slot is part of the shape;
    /// descriptions differing only in `bind` values share one compiled plan.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.args.push(ArgExpr::Bind(value.into()));
        self
    }

    pub fn skeleton(&self) -> &str {
        &self.skeleton
    }

    pub(crate) fn args(&self) -> &[ArgExpr] {
        &self.args
    }
}
