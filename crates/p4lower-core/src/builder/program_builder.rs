use crate::declarations::{
    BlockDecl, BlockKind, DeclKind, Declaration, HeaderInstance, MethodSignature,
};
use crate::expressions::{
    BinaryOp, Expr, ExprKind, FieldRef, MemberExpr, MethodCall, NamedExpr, PathExpr, SelectCase,
    UnaryOp,
};
use crate::ids::{BlockId, DeclId, ExprId, HeaderInstanceId, TypeDeclId};
use crate::program::Program;
use crate::types::{EnumMember, Field, Type, TypeDecl, TypeDeclKind};
use crate::{IrError, Result};
use num_bigint::BigInt;

pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self {
            program: Program::new(),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn build(self) -> Result<Program> {
        self.program.validate()?;
        Ok(self.program)
    }

    fn add_type_decl(&mut self, decl: TypeDecl) -> TypeDeclId {
        let id = TypeDeclId(self.program.type_decls.len() as u32);
        self.program.type_decls.push(decl);
        id
    }

    pub fn header_type(&mut self, name: &str, fields: Vec<Field>) -> TypeDeclId {
        self.add_type_decl(TypeDecl {
            name: name.to_string(),
            kind: TypeDeclKind::Header { fields },
        })
    }

    pub fn metadata_type(&mut self, name: &str, fields: Vec<Field>) -> TypeDeclId {
        self.add_type_decl(TypeDecl {
            name: name.to_string(),
            kind: TypeDeclKind::Struct {
                fields,
                is_metadata: true,
            },
        })
    }

    pub fn struct_type(&mut self, name: &str, fields: Vec<Field>) -> TypeDeclId {
        self.add_type_decl(TypeDecl {
            name: name.to_string(),
            kind: TypeDeclKind::Struct {
                fields,
                is_metadata: false,
            },
        })
    }

    /// Member C names are `<c_name>_<member>`, with `enum_<name>` as the enum's C name.
    pub fn enum_type(&mut self, name: &str, members: &[&str]) -> TypeDeclId {
        let c_name = format!("enum_{}", name);
        let members = members
            .iter()
            .map(|m| EnumMember {
                name: m.to_string(),
                c_name: format!("{}_{}", c_name, m),
            })
            .collect();
        self.add_type_decl(TypeDecl {
            name: name.to_string(),
            kind: TypeDeclKind::Enum { c_name, members },
        })
    }

    pub fn error_type(&mut self, members: &[&str]) -> TypeDeclId {
        let members = members
            .iter()
            .map(|m| EnumMember {
                name: m.to_string(),
                c_name: format!("error_{}", m),
            })
            .collect();
        self.add_type_decl(TypeDecl {
            name: "error".to_string(),
            kind: TypeDeclKind::Error {
                c_name: "error_error".to_string(),
                members,
            },
        })
    }

    pub fn extern_type(
        &mut self,
        name: &str,
        type_params: &[&str],
        methods: Vec<MethodSignature>,
    ) -> TypeDeclId {
        self.add_type_decl(TypeDecl {
            name: name.to_string(),
            kind: TypeDeclKind::Extern {
                type_params: type_params.iter().map(|p| p.to_string()).collect(),
                methods,
            },
        })
    }

    pub fn header_instance(&mut self, name: &str, header_type: TypeDeclId) -> HeaderInstanceId {
        let is_metadata = self
            .program
            .type_decls
            .get(header_type.index())
            .map(TypeDecl::is_metadata)
            .unwrap_or(false);
        let id = HeaderInstanceId(self.program.header_instances.len() as u32);
        self.program.header_instances.push(HeaderInstance {
            name: name.to_string(),
            header_type,
            is_metadata,
        });
        id
    }

    pub fn declare(&mut self, name: &str, kind: DeclKind) -> DeclId {
        let id = DeclId(self.program.decls.len() as u32);
        self.program.decls.push(Declaration::new(name, kind));
        id
    }

    pub fn variable(&mut self, name: &str, ty: Type) -> DeclId {
        self.declare(
            name,
            DeclKind::Variable {
                ty,
                initializer: None,
            },
        )
    }

    fn add_block(&mut self, name: &str, type_name: &str, kind: BlockKind) -> BlockId {
        let id = BlockId(self.program.blocks.len() as u32);
        self.program.blocks.push(BlockDecl {
            name: name.to_string(),
            type_name: type_name.to_string(),
            kind,
            locals: Vec::new(),
        });
        id
    }

    pub fn control(&mut self, name: &str, type_name: &str) -> BlockId {
        self.add_block(name, type_name, BlockKind::Control)
    }

    pub fn parser(&mut self, name: &str, type_name: &str) -> BlockId {
        self.add_block(name, type_name, BlockKind::Parser)
    }

    pub fn add_local(&mut self, block: BlockId, decl: DeclId) -> Result<()> {
        let block = self
            .program
            .blocks
            .get_mut(block.index())
            .ok_or_else(|| IrError::DanglingHandle(block.to_string()))?;
        block.locals.push(decl);
        Ok(())
    }

    pub fn expr(&mut self, ty: Type, kind: ExprKind) -> ExprId {
        let id = ExprId(self.program.exprs.len() as u32);
        self.program.exprs.push(Expr { id, ty, kind });
        id
    }

    fn type_of(&self, id: ExprId) -> Type {
        self.program
            .exprs
            .get(id.index())
            .map(|e| e.ty.clone())
            .unwrap_or(Type::Void)
    }

    pub fn constant(&mut self, ty: Type, value: impl Into<BigInt>) -> ExprId {
        self.expr(
            ty,
            ExprKind::Constant {
                value: value.into(),
                base: 10,
            },
        )
    }

    pub fn hex_constant(&mut self, ty: Type, value: impl Into<BigInt>) -> ExprId {
        self.expr(
            ty,
            ExprKind::Constant {
                value: value.into(),
                base: 16,
            },
        )
    }

    pub fn bool_lit(&mut self, value: bool) -> ExprId {
        self.expr(Type::Bool, ExprKind::Bool(value))
    }

    pub fn str_lit(&mut self, value: &str) -> ExprId {
        self.expr(Type::String, ExprKind::Str(value.to_string()))
    }

    pub fn default_expr(&mut self) -> ExprId {
        self.expr(Type::Void, ExprKind::Default)
    }

    /// A path resolved to `decl`, typed with the declaration's value type.
    pub fn path(&mut self, decl: DeclId) -> Result<ExprId> {
        let declaration = self.program.decl(decl)?;
        let name = declaration.name.clone();
        let ty = declaration.value_type();
        Ok(self.expr(
            ty,
            ExprKind::Path(PathExpr {
                name,
                decl: Some(decl),
                absolute: false,
            }),
        ))
    }

    /// A path with no resolved declaration, e.g. the receiver of a free function call.
    pub fn named_path(&mut self, name: &str, ty: Type) -> ExprId {
        self.expr(
            ty,
            ExprKind::Path(PathExpr {
                name: name.to_string(),
                decl: None,
                absolute: false,
            }),
        )
    }

    pub fn member(&mut self, base: ExprId, member: &str, ty: Type) -> ExprId {
        self.expr(
            ty,
            ExprKind::Member(MemberExpr {
                base,
                member: member.to_string(),
                header: None,
                field: None,
            }),
        )
    }

    /// `hdr.<instance>` for a named header, or the metadata path for metadata instances.
    pub fn header_ref(&mut self, instance: HeaderInstanceId) -> Result<ExprId> {
        let inst = self.program.header_instance(instance)?.clone();
        if inst.is_metadata {
            let ty = Type::Struct(inst.header_type);
            return Ok(self.named_path(&inst.name, ty));
        }

        let ty = Type::Header(inst.header_type);
        let base = self.named_path("hdr", Type::Void);
        Ok(self.expr(
            ty,
            ExprKind::Member(MemberExpr {
                base,
                member: inst.name,
                header: Some(instance),
                field: None,
            }),
        ))
    }

    /// `hdr.<instance>.<field>` (or `meta.<field>`), resolved against the instance's type.
    pub fn field(&mut self, instance: HeaderInstanceId, name: &str) -> Result<ExprId> {
        let header_type = self.program.header_type_of(instance)?;
        let index = header_type.field_index(name).ok_or_else(|| {
            IrError::MissingName(format!("field {} of {}", name, header_type.name))
        })?;
        let ty = header_type.fields()[index].ty.clone();

        let base = self.header_ref(instance)?;
        Ok(self.expr(
            ty,
            ExprKind::Member(MemberExpr {
                base,
                member: name.to_string(),
                header: None,
                field: Some(FieldRef {
                    instance,
                    field: index,
                }),
            }),
        ))
    }

    pub fn enum_member(&mut self, enum_type: TypeDeclId, member: &str) -> Result<ExprId> {
        let decl = self.program.type_decl(enum_type)?;
        if decl.enum_member(member).is_none() {
            return Err(IrError::MissingName(format!(
                "member {} of {}",
                member, decl.name
            )));
        }
        let ty = match decl.kind {
            TypeDeclKind::Error { .. } => Type::Error(enum_type),
            _ => Type::Enum(enum_type),
        };
        let base = self.expr(ty.clone(), ExprKind::TypeName(ty.clone()));
        Ok(self.member(base, member, ty))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        let ty = match op {
            UnaryOp::LNot => Type::Bool,
            UnaryOp::Neg | UnaryOp::Cmpl => self.type_of(operand),
        };
        self.expr(ty, ExprKind::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let ty = match op {
            BinaryOp::Grt
            | BinaryOp::Geq
            | BinaryOp::Lss
            | BinaryOp::Leq
            | BinaryOp::Equ
            | BinaryOp::Neq
            | BinaryOp::LAnd
            | BinaryOp::LOr => Type::Bool,
            _ => self.type_of(left),
        };
        self.expr(ty, ExprKind::Binary { op, left, right })
    }

    pub fn mux(&mut self, cond: ExprId, if_true: ExprId, if_false: ExprId) -> ExprId {
        let ty = self.type_of(if_true);
        self.expr(
            ty,
            ExprKind::Mux {
                cond,
                if_true,
                if_false,
            },
        )
    }

    pub fn slice(&mut self, base: ExprId, hi: u32, lo: u32) -> ExprId {
        self.expr(Type::bits(hi - lo + 1), ExprKind::Slice { base, hi, lo })
    }

    pub fn concat(&mut self, left: ExprId, right: ExprId) -> ExprId {
        let width =
            self.type_of(left).width().unwrap_or(0) + self.type_of(right).width().unwrap_or(0);
        self.expr(Type::bits(width), ExprKind::Concat { left, right })
    }

    pub fn cast(&mut self, dest: Type, operand: ExprId) -> ExprId {
        self.expr(dest.clone(), ExprKind::Cast { dest, operand })
    }

    pub fn list(&mut self, items: Vec<ExprId>) -> ExprId {
        let ty = Type::Tuple(items.iter().map(|i| self.type_of(*i)).collect());
        self.expr(ty, ExprKind::List(items))
    }

    pub fn struct_init(&mut self, ty: Type, components: Vec<(&str, ExprId)>) -> ExprId {
        let components = components
            .into_iter()
            .map(|(name, value)| NamedExpr {
                name: name.to_string(),
                value,
            })
            .collect();
        self.expr(ty, ExprKind::StructInit(components))
    }

    pub fn select(&mut self, keys: Vec<ExprId>, cases: Vec<(ExprId, &str)>) -> ExprId {
        let cases = cases
            .into_iter()
            .map(|(keyset, state)| SelectCase {
                keyset,
                state: state.to_string(),
            })
            .collect();
        self.expr(Type::Void, ExprKind::Select { keys, cases })
    }

    pub fn mask(&mut self, value: ExprId, mask: ExprId) -> ExprId {
        let ty = self.type_of(value);
        self.expr(ty, ExprKind::Mask { value, mask })
    }

    pub fn range(&mut self, low: ExprId, high: ExprId) -> ExprId {
        let ty = self.type_of(low);
        self.expr(ty, ExprKind::Range { low, high })
    }

    pub fn type_name(&mut self, ty: Type) -> ExprId {
        self.expr(ty.clone(), ExprKind::TypeName(ty))
    }

    pub fn call(&mut self, method: ExprId, args: Vec<ExprId>, ty: Type) -> ExprId {
        self.call_generic(method, Vec::new(), args, ty)
    }

    pub fn call_generic(
        &mut self,
        method: ExprId,
        type_args: Vec<Type>,
        args: Vec<ExprId>,
        ty: Type,
    ) -> ExprId {
        self.expr(
            ty,
            ExprKind::MethodCall(MethodCall {
                method,
                type_args,
                args,
            }),
        )
    }

    /// `<receiver>.<method>(args)`.
    pub fn method_call(
        &mut self,
        receiver: ExprId,
        method: &str,
        args: Vec<ExprId>,
        ty: Type,
    ) -> ExprId {
        let member = self.member(receiver, method, Type::Void);
        self.call(member, args, ty)
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}
