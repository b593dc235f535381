use crate::declarations::{BlockDecl, DeclKind, Declaration, HeaderInstance};
use crate::expressions::{Expr, ExprKind, FieldRef};
use crate::ids::{BlockId, DeclId, ExprId, HeaderInstanceId, TypeDeclId};
use crate::types::{Field, Type, TypeDecl, TypeDeclKind};
use crate::{IrError, Result};
use serde::{Deserialize, Serialize};

/// A whole program as handed over by the front end: every node lives in one of the arenas
/// below and is referenced from elsewhere only through its handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub exprs: Vec<Expr>,
    pub decls: Vec<Declaration>,
    pub type_decls: Vec<TypeDecl>,
    pub header_instances: Vec<HeaderInstance>,
    pub blocks: Vec<BlockDecl>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let program: Program = serde_json::from_str(json)?;
        program.validate()?;
        Ok(program)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn expr(&self, id: ExprId) -> Result<&Expr> {
        self.exprs
            .get(id.index())
            .ok_or_else(|| IrError::DanglingHandle(format!("expression {}", id)))
    }

    pub fn decl(&self, id: DeclId) -> Result<&Declaration> {
        self.decls
            .get(id.index())
            .ok_or_else(|| IrError::DanglingHandle(id.to_string()))
    }

    pub fn type_decl(&self, id: TypeDeclId) -> Result<&TypeDecl> {
        self.type_decls
            .get(id.index())
            .ok_or_else(|| IrError::DanglingHandle(id.to_string()))
    }

    pub fn header_instance(&self, id: HeaderInstanceId) -> Result<&HeaderInstance> {
        self.header_instances
            .get(id.index())
            .ok_or_else(|| IrError::DanglingHandle(id.to_string()))
    }

    pub fn block(&self, id: BlockId) -> Result<&BlockDecl> {
        self.blocks
            .get(id.index())
            .ok_or_else(|| IrError::DanglingHandle(id.to_string()))
    }

    pub fn header_type_of(&self, id: HeaderInstanceId) -> Result<&TypeDecl> {
        let instance = self.header_instance(id)?;
        self.type_decl(instance.header_type)
    }

    pub fn field(&self, field: FieldRef) -> Result<&Field> {
        let header = self.header_type_of(field.instance)?;
        header.fields().get(field.field).ok_or_else(|| {
            IrError::DanglingHandle(format!("field #{} of {}", field.field, header.name))
        })
    }

    pub fn find_type_decl(&self, name: &str) -> Option<TypeDeclId> {
        self.type_decls
            .iter()
            .position(|t| t.name == name)
            .map(|i| TypeDeclId(i as u32))
    }

    pub fn find_header_instance(&self, name: &str) -> Option<HeaderInstanceId> {
        self.header_instances
            .iter()
            .position(|h| h.name == name)
            .map(|i| HeaderInstanceId(i as u32))
    }

    pub fn find_block(&self, name: &str) -> Option<BlockId> {
        self.blocks
            .iter()
            .position(|b| b.name == name)
            .map(|i| BlockId(i as u32))
    }

    /// Whether `decl` is declared among the locals of `block`.
    pub fn is_local_of(&self, block: BlockId, decl: DeclId) -> bool {
        self.blocks
            .get(block.index())
            .map(|b| b.locals.contains(&decl))
            .unwrap_or(false)
    }

    /// The name a type reference carries in the source program.
    pub fn type_name(&self, ty: &Type) -> Option<&str> {
        ty.decl()
            .and_then(|id| self.type_decls.get(id.index()))
            .map(|t| t.name.as_str())
    }

    pub fn validate(&self) -> Result<()> {
        for (index, expr) in self.exprs.iter().enumerate() {
            if expr.id.index() != index {
                return Err(IrError::MalformedArena(format!(
                    "expression at index {} carries id {}",
                    index, expr.id
                )));
            }
            self.validate_expr(expr)?;
        }

        for decl in &self.decls {
            self.validate_decl(decl)?;
        }

        for ty in &self.type_decls {
            for field in ty.fields() {
                self.validate_type(&field.ty)?;
            }
            if let TypeDeclKind::Extern { methods, .. } = &ty.kind {
                for method in methods {
                    self.validate_type(&method.return_type)?;
                    for param in &method.params {
                        self.validate_type(&param.ty)?;
                    }
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        for instance in &self.header_instances {
            self.type_decl(instance.header_type)?;
            if !seen.insert(instance.name.as_str()) {
                return Err(IrError::DuplicateName(format!(
                    "header instance {}",
                    instance.name
                )));
            }
        }

        for block in &self.blocks {
            for local in &block.locals {
                self.decl(*local)?;
            }
        }

        Ok(())
    }

    fn validate_expr(&self, expr: &Expr) -> Result<()> {
        self.validate_type(&expr.ty)?;
        // Children precede their parent, so the expression graph cannot loop.
        for child in expr.kind.children() {
            self.expr(child)?;
            if child.index() >= expr.id.index() {
                return Err(IrError::MalformedArena(format!(
                    "expression {} refers to expression {}, which does not precede it",
                    expr.id, child
                )));
            }
        }
        match &expr.kind {
            ExprKind::Path(path) => {
                if let Some(decl) = path.decl {
                    self.decl(decl)?;
                }
            }
            ExprKind::Member(member) => {
                if let Some(header) = member.header {
                    self.header_instance(header)?;
                }
                if let Some(field) = member.field {
                    self.field(field)?;
                }
            }
            ExprKind::Cast { dest, .. } => self.validate_type(dest)?,
            ExprKind::TypeName(ty) => self.validate_type(ty)?,
            ExprKind::MethodCall(call) => {
                for ty in &call.type_args {
                    self.validate_type(ty)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn validate_decl(&self, decl: &Declaration) -> Result<()> {
        match &decl.kind {
            DeclKind::Variable { ty, initializer } => {
                self.validate_type(ty)?;
                if let Some(init) = initializer {
                    self.expr(*init)?;
                }
            }
            DeclKind::Instance { ty, args } => {
                self.validate_type(ty)?;
                for arg in args {
                    self.expr(*arg)?;
                }
            }
            DeclKind::Parameter { ty, .. } => self.validate_type(ty)?,
            DeclKind::Constant { ty, value } => {
                self.validate_type(ty)?;
                self.expr(*value)?;
            }
            DeclKind::Function(sig) => {
                self.validate_type(&sig.return_type)?;
                for param in &sig.params {
                    self.validate_type(&param.ty)?;
                }
            }
            DeclKind::Table | DeclKind::Action => {}
        }
        Ok(())
    }

    fn validate_type(&self, ty: &Type) -> Result<()> {
        if let Some(id) = ty.decl() {
            self.type_decl(id)?;
        }
        match ty {
            Type::Specialized { args, .. } | Type::Tuple(args) => {
                for arg in args {
                    self.validate_type(arg)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
