//! Width-exact arithmetic: C's integer promotions and wraparound rules are never relied upon,
//! every unsigned result is masked back to its declared width.

use super::{ExprMode, Lowering, TypeStyle};
use crate::bits::{byte_width, power_of_two};
use crate::diagnostics::Category;
use crate::error::Result;
use p4lower_core::{BinaryOp, Expr, ExprId, Type, UnaryOp};

const STAGE: &str = "formatting an expression";

fn pp(ty: &Type) -> String {
    ty.to_string()
}

/// Width of a bit type too wide for a native container.
fn wide_width(ty: &Type) -> Option<u32> {
    ty.width().filter(|w| *w > 32)
}

impl Lowering<'_> {
    pub(crate) fn unary(
        &mut self,
        e: &Expr,
        op: UnaryOp,
        operand: ExprId,
        mode: ExprMode,
    ) -> Result<String> {
        if let (UnaryOp::Neg | UnaryOp::Cmpl, Some(width)) = (op, wide_width(&e.ty)) {
            self.error(
                Category::UnsupportedWidth,
                STAGE,
                format!("Operator {:?} on bit<{}> is not supported", op, width),
            );
            return Ok(String::new());
        }

        let inner = self.expr(operand, mode.child())?;
        Ok(match op {
            UnaryOp::Neg => match &e.ty {
                Type::Bits {
                    width,
                    signed: false,
                } => {
                    let mask = self.format_type_mask(&e.ty);
                    format!("({}({}-{}))", mask, power_of_two(*width), inner)
                }
                _ => format!("(-{})", inner),
            },
            UnaryOp::Cmpl => {
                let mask = self.format_type_mask(&e.ty);
                format!("({}(~{}))", mask, inner)
            }
            UnaryOp::LNot => format!("(!{})", inner),
        })
    }

    pub(crate) fn binary(
        &mut self,
        e: &Expr,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        mode: ExprMode,
    ) -> Result<String> {
        let program = self.program;
        let left_ty = &program.expr(left)?.ty;
        let right_ty = &program.expr(right)?.ty;

        if op.is_equality() {
            if let Some(width) = wide_width(left_ty).or_else(|| wide_width(right_ty)) {
                let l = self.expr(left, mode.child())?;
                let r = self.expr(right, mode.child())?;
                let cmp = if op == BinaryOp::Equ { "==" } else { "!=" };
                return Ok(format!(
                    "0 {} memcmp({}, {}, {})",
                    cmp,
                    l,
                    r,
                    byte_width(width)
                ));
            }
        }

        // Wide operands are byte buffers; C operators would act on their addresses.
        let wide = [left_ty, right_ty, &e.ty]
            .into_iter()
            .filter_map(wide_width)
            .max();
        if let (Some(width), false) = (wide, op.is_equality()) {
            self.error(
                Category::UnsupportedWidth,
                STAGE,
                format!(
                    "Operator {:?} on {}-bit operands is not supported; only == and != work above 32 bits",
                    op, width
                ),
            );
            return Ok(String::new());
        }

        let l = self.expr(left, mode.child())?;
        let r = self.expr(right, mode.child())?;

        if !op.is_width_sensitive() {
            return Ok(format!("({}{}{})", l, op.symbol(), r));
        }

        match (&e.ty, op) {
            (
                Type::Bits {
                    width,
                    signed: false,
                },
                BinaryOp::Sub | BinaryOp::SubSat,
            ) => {
                // a - b == a + (2^w - b) (mod 2^w)
                let mask = self.format_type_mask(&e.ty);
                Ok(format!(
                    "({}({}+({}-{})))",
                    mask,
                    l,
                    power_of_two(*width),
                    r
                ))
            }
            (
                Type::Bits {
                    width,
                    signed: true,
                },
                BinaryOp::Shr,
            ) => Ok(format!("(({1}>{2}) ? 0 : ({0} >> {1}))", l, r, width)),
            (Type::InfInt, _) => Ok(format!("({}{}{})", l, op.symbol(), r)),
            (Type::Bits { signed: false, .. }, _) => {
                let mask = self.format_type_mask(&e.ty);
                Ok(format!("({}({}{}{}))", mask, l, op.symbol(), r))
            }
            (Type::Bits { width, signed: true }, _) => {
                if matches!(width, 8 | 16 | 32) {
                    let ty = self.format_type(&e.ty, TypeStyle::PARAMETER);
                    Ok(format!("(({}) ({}{}{}))", ty, l, op.symbol(), r))
                } else {
                    self.error(
                        Category::UnsupportedWidth,
                        STAGE,
                        format!(
                            "Expression of type {:?} is not supported on int<{}>. (Only int<8>, int<16> and int<32> are supported.)",
                            op, width
                        ),
                    );
                    Ok(String::new())
                }
            }
            (other, _) => {
                self.error(
                    Category::UnsupportedConstruct,
                    STAGE,
                    format!("Operator {:?} on {} is not supported", op, pp(other)),
                );
                Ok(String::new())
            }
        }
    }

    pub(crate) fn slice(
        &mut self,
        e: &Expr,
        base: ExprId,
        lo: u32,
        mode: ExprMode,
    ) -> Result<String> {
        let inner = self.expr(base, mode.child())?;
        let mask = self.format_type_mask(&e.ty);
        Ok(format!("({}({}>>{}))", mask, inner, lo))
    }

    pub(crate) fn concat(&mut self, left: ExprId, right: ExprId, mode: ExprMode) -> Result<String> {
        let program = self.program;
        let right_width = program.expr(right)?.ty.width().unwrap_or(0);
        let l = self.expr(left, mode.child())?;
        let r = self.expr(right, mode.child())?;
        Ok(format!("(({}<<{}) | {})", l, right_width, r))
    }

    pub(crate) fn cast(&mut self, dest: &Type, operand: ExprId, mode: ExprMode) -> Result<String> {
        let program = self.program;
        let src = &program.expr(operand)?.ty;
        let inner = self.expr(operand, mode.child())?;

        let text = match (src, dest) {
            (
                Type::Bits {
                    width: 1,
                    signed: false,
                },
                Type::Bool,
            ) => format!("({})", inner),
            (
                Type::Bool,
                Type::Bits {
                    width: 1,
                    signed: false,
                },
            ) => format!("({}? 1 : 0)", inner),
            (
                Type::Bits {
                    width: from,
                    signed: false,
                },
                Type::Bits {
                    width: to,
                    signed: false,
                },
            ) => {
                if from > to {
                    let mask = self.format_type_mask(dest);
                    format!("({}{})", mask, inner)
                } else {
                    inner
                }
            }
            (Type::Bits { signed: true, .. }, Type::Bits { signed: true, .. }) => {
                let ty = self.format_type(dest, TypeStyle::PARAMETER);
                format!("(({}) {})", ty, inner)
            }
            (Type::Bits { signed: true, .. }, Type::Bits { signed: false, .. }) => {
                let mask = self.format_type_mask(dest);
                format!("({}{})", mask, inner)
            }
            (Type::Bits { signed: false, .. }, Type::Bits { width, signed: true }) => {
                if matches!(width, 8 | 16 | 32) {
                    let ty = self.format_type(dest, TypeStyle::PARAMETER);
                    format!("(({}){})", ty, inner)
                } else {
                    self.error(
                        Category::UnsupportedWidth,
                        STAGE,
                        format!(
                            "Cast from {} to int<{}> is not supported! (Only int<8>, int<16> and int<32> are supported.)",
                            pp(src),
                            width
                        ),
                    );
                    String::new()
                }
            }
            _ => {
                self.error(
                    Category::UnsupportedConstruct,
                    STAGE,
                    format!("Cast from {} to {} is not supported!", pp(src), pp(dest)),
                );
                String::new()
            }
        };
        Ok(text)
    }
}
