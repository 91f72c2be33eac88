use crate::dictionary::Entry;
use crate::error::ForthError;
use crate::input::{self, Token};
use crate::memory::{BASE_ADDR, DEFAULT_BASE};
use crate::{format_num, Capture, Cell, ForthMachine, FrameKind, Mode, Notice};
use std::convert::TryFrom;

pub const FORTH_TRUE: Cell = -1;
pub const FORTH_FALSE: Cell = 0;

fn flag(val: bool) -> Cell {
    if val {
        FORTH_TRUE
    } else {
        FORTH_FALSE
    }
}

/// Every word with behavior fixed by the interpreter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
    // Stack manipulation
    Dup,
    Drop,
    Swap,
    Over,
    Nip,
    Rot,
    MinusRot,
    Pick,
    Roll,
    Clear,
    Depth,
    // Arithmetic & comparison
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    SlashMod,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Bit operations
    And,
    Or,
    Xor,
    Invert,
    Lshift,
    Rshift,
    // Output
    Dot,
    DotS,
    DotQuote,
    Emit,
    Cr,
    Space,
    Type,
    // Memory
    Fetch,
    Store,
    PlusStore,
    Allot,
    Here,
    Unused,
    Variable,
    Constant,
    SQuote,
    Count,
    Fill,
    Move,
    Place,
    PlusPlace,
    Base,
    Hex,
    Decimal,
    // Control flow
    If,
    Do,
    I,
    J,
    // Dictionary
    Colon,
    Words,
    See,
    // Session
    Allocate,
    Debug,
    Bye,
}

pub const BUILTIN_WORDS: [(&str, Builtin); 65] = [
    // Stack manipulation
    (".s", Builtin::DotS),
    ("-rot", Builtin::MinusRot),
    ("clear", Builtin::Clear),
    ("depth", Builtin::Depth),
    ("drop", Builtin::Drop),
    ("dup", Builtin::Dup),
    ("nip", Builtin::Nip),
    ("over", Builtin::Over),
    ("pick", Builtin::Pick),
    ("roll", Builtin::Roll),
    ("rot", Builtin::Rot),
    ("swap", Builtin::Swap),
    // Arithmetic
    ("*", Builtin::Mul),
    ("+", Builtin::Add),
    ("-", Builtin::Sub),
    ("/", Builtin::Div),
    ("/mod", Builtin::SlashMod),
    ("^", Builtin::Pow),
    ("mod", Builtin::Mod),
    // Comparison
    ("!=", Builtin::Ne),
    ("<", Builtin::Lt),
    ("<=", Builtin::Le),
    ("<>", Builtin::Ne),
    ("=", Builtin::Eq),
    (">", Builtin::Gt),
    (">=", Builtin::Ge),
    // Bit operations
    ("and", Builtin::And),
    ("invert", Builtin::Invert),
    ("lshift", Builtin::Lshift),
    ("or", Builtin::Or),
    ("rshift", Builtin::Rshift),
    ("xor", Builtin::Xor),
    // Output
    (".", Builtin::Dot),
    (".\"", Builtin::DotQuote),
    ("cr", Builtin::Cr),
    ("emit", Builtin::Emit),
    ("space", Builtin::Space),
    ("type", Builtin::Type),
    // Memory
    ("!", Builtin::Store),
    ("+!", Builtin::PlusStore),
    ("+place", Builtin::PlusPlace),
    ("@", Builtin::Fetch),
    ("allot", Builtin::Allot),
    ("base", Builtin::Base),
    ("constant", Builtin::Constant),
    ("count", Builtin::Count),
    ("decimal", Builtin::Decimal),
    ("fill", Builtin::Fill),
    ("here", Builtin::Here),
    ("hex", Builtin::Hex),
    ("move", Builtin::Move),
    ("place", Builtin::Place),
    ("s\"", Builtin::SQuote),
    ("unused", Builtin::Unused),
    ("variable", Builtin::Variable),
    // Control flow
    ("do", Builtin::Do),
    ("i", Builtin::I),
    ("if", Builtin::If),
    ("j", Builtin::J),
    // Dictionary
    (":", Builtin::Colon),
    ("see", Builtin::See),
    ("words", Builtin::Words),
    // Session
    ("allocate", Builtin::Allocate),
    ("bye", Builtin::Bye),
    ("debug", Builtin::Debug),
];

type BuiltinFn = fn(&mut ForthMachine) -> Result<(), ForthError>;

impl Builtin {
    pub fn name(self) -> &'static str {
        BUILTIN_WORDS
            .iter()
            .find(|(_, builtin)| *builtin == self)
            .map_or("?", |(name, _)| *name)
    }

    /// Minimum data stack depth required before the word runs.
    pub fn arity(self) -> usize {
        use Builtin::*;
        match self {
            Clear | Depth | DotS | DotQuote | Cr | Space | Here | Unused | Variable | SQuote
            | Base | Hex | Decimal | I | J | Colon | Words | See | Debug | Bye => 0,
            Dup | Drop | Pick | Roll | Invert | Dot | Emit | Fetch | Allot | Constant | Count
            | If | Allocate => 1,
            Swap | Over | Nip | Add | Sub | Mul | Div | Mod | SlashMod | Pow | Eq | Ne | Lt
            | Gt | Le | Ge | And | Or | Xor | Lshift | Rshift | Type | Store | PlusStore | Do => 2,
            Rot | MinusRot | Fill | Move | Place | PlusPlace => 3,
        }
    }

    fn func(self) -> BuiltinFn {
        use Builtin::*;
        match self {
            Dup => dup_builtin,
            Drop => drop_builtin,
            Swap => swap_builtin,
            Over => over_builtin,
            Nip => nip_builtin,
            Rot => rot_builtin,
            MinusRot => minus_rot_builtin,
            Pick => pick_builtin,
            Roll => roll_builtin,
            Clear => clear_builtin,
            Depth => depth_builtin,
            Add => add_builtin,
            Sub => sub_builtin,
            Mul => mul_builtin,
            Div => div_builtin,
            Mod => mod_builtin,
            SlashMod => slash_mod_builtin,
            Pow => pow_builtin,
            Eq => eq_builtin,
            Ne => ne_builtin,
            Lt => less_than_builtin,
            Gt => greater_than_builtin,
            Le => less_equal_builtin,
            Ge => greater_equal_builtin,
            And => and_builtin,
            Or => or_builtin,
            Xor => xor_builtin,
            Invert => invert_builtin,
            Lshift => lshift_builtin,
            Rshift => rshift_builtin,
            Dot => dot_builtin,
            DotS => print_data_stack_builtin,
            DotQuote => dot_quote_builtin,
            Emit => emit_builtin,
            Cr => cr_builtin,
            Space => space_builtin,
            Type => type_builtin,
            Fetch => fetch_builtin,
            Store => store_builtin,
            PlusStore => plus_store_builtin,
            Allot => allot_builtin,
            Here => here_builtin,
            Unused => unused_builtin,
            Variable => variable_builtin,
            Constant => constant_builtin,
            SQuote => s_quote_builtin,
            Count => count_builtin,
            Fill => fill_builtin,
            Move => move_builtin,
            Place => place_builtin,
            PlusPlace => plus_place_builtin,
            Base => base_builtin,
            Hex => hex_builtin,
            Decimal => decimal_builtin,
            If => if_builtin,
            Do => do_builtin,
            I => loop_i_builtin,
            J => loop_j_builtin,
            Colon => colon_builtin,
            Words => words_builtin,
            See => see_builtin,
            Allocate => allocate_builtin,
            Debug => debug_builtin,
            Bye => bye_builtin,
        }
    }

    /// Run the word after checking its stack depth requirement.
    ///
    /// An unmet requirement leaves the stack untouched.
    pub fn execute(self, forth: &mut ForthMachine) -> Result<(), ForthError> {
        let arity = self.arity();
        if forth.data_stack.len() < arity {
            return Err(ForthError::DataStackEmpty(self.name(), arity));
        }
        forth.curr_word = self.name();
        (self.func())(forth)
    }
}

fn ds_pop(forth: &mut ForthMachine) -> Result<Cell, ForthError> {
    let word = forth.curr_word;
    forth
        .data_stack
        .pop()
        .ok_or(ForthError::DataStackEmpty(word, 1))
}
fn ds_pop_2(forth: &mut ForthMachine) -> Result<(Cell, Cell), ForthError> {
    let b = ds_pop(forth)?;
    let a = ds_pop(forth)?;
    Ok((a, b))
}
pub(crate) fn ds_push(forth: &mut ForthMachine, val: Cell) -> Result<(), ForthError> {
    let max = forth.data_stack.max_elements();
    forth
        .data_stack
        .push(val)
        .ok_or(ForthError::DataStackLimitReached(max))
}
fn ds_peek(forth: &ForthMachine, n: usize) -> Result<Cell, ForthError> {
    forth
        .data_stack
        .peek(n)
        .ok_or(ForthError::DataStackEmpty(forth.curr_word, n + 1))
}
// Pop a cell used as a length or count.
fn ds_pop_count(forth: &mut ForthMachine) -> Result<usize, ForthError> {
    let n = ds_pop(forth)?;
    usize::try_from(n).map_err(|_| ForthError::NegativeCount(forth.curr_word, n))
}

fn next_name(forth: &mut ForthMachine) -> Result<Token, ForthError> {
    forth
        .cursor()
        .next()
        .ok_or(ForthError::MissingDefinitionName)
}

fn dup_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let val = ds_peek(forth, 0)?;
    ds_push(forth, val)
}

fn drop_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    ds_pop(forth)?;
    Ok(())
}

fn swap_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let a = ds_pop(forth)?;
    let b = ds_pop(forth)?;
    ds_push(forth, a)?;
    ds_push(forth, b)
}

fn over_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let val = ds_peek(forth, 1)?;
    ds_push(forth, val)
}

fn nip_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let val = ds_pop(forth)?;
    let word = forth.curr_word;
    *forth
        .data_stack
        .last_mut()
        .ok_or(ForthError::DataStackEmpty(word, 2))? = val;
    Ok(())
}

// ( a b c -- b c a )
fn rot_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let a = ds_pop(forth)?;
    let b = ds_pop(forth)?;
    let c = ds_pop(forth)?;
    ds_push(forth, b)?;
    ds_push(forth, a)?;
    ds_push(forth, c)
}

// ( a b c -- c a b )
fn minus_rot_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let a = ds_pop(forth)?;
    let b = ds_pop(forth)?;
    let c = ds_pop(forth)?;
    ds_push(forth, a)?;
    ds_push(forth, c)?;
    ds_push(forth, b)
}

// The index counts from the top once it is popped itself, and must be in
// [1, depth). It is validated before anything is popped.
fn pick_roll_index(forth: &ForthMachine) -> Result<usize, ForthError> {
    let n = ds_peek(forth, 0)?;
    let depth = forth.data_stack.len() - 1;
    match usize::try_from(n) {
        Ok(ix) if ix >= 1 && ix < depth => Ok(ix),
        _ => Err(ForthError::PickOutOfBounds(n)),
    }
}

// ( xn ... x0 n -- xn ... x0 xn )
fn pick_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let ix = pick_roll_index(forth)?;
    ds_pop(forth)?;
    let val = ds_peek(forth, ix)?;
    ds_push(forth, val)
}

// ( xn ... x0 n -- xn-1 ... x0 xn )
fn roll_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let ix = pick_roll_index(forth)?;
    ds_pop(forth)?;
    let word = forth.curr_word;
    let val = forth
        .data_stack
        .remove(ix)
        .ok_or(ForthError::DataStackEmpty(word, ix + 1))?;
    ds_push(forth, val)
}

fn clear_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    forth.data_stack.clear();
    Ok(())
}

fn depth_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let depth = forth.data_stack.len() as Cell;
    ds_push(forth, depth)
}

fn add_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, a.wrapping_add(b))
}

fn sub_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, a.wrapping_sub(b))
}

fn mul_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, a.wrapping_mul(b))
}

// Division truncates toward zero, the remainder takes the sign of the
// dividend. A zero divisor is reported before anything is popped.
fn pop_division(forth: &mut ForthMachine) -> Result<(Cell, Cell), ForthError> {
    if ds_peek(forth, 0)? == 0 {
        return Err(ForthError::DivByZero);
    }
    ds_pop_2(forth)
}

fn div_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = pop_division(forth)?;
    ds_push(forth, a.wrapping_div(b))
}

fn mod_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = pop_division(forth)?;
    ds_push(forth, a.wrapping_rem(b))
}

// ( a b -- rem quot )
fn slash_mod_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = pop_division(forth)?;
    ds_push(forth, a.wrapping_rem(b))?;
    ds_push(forth, a.wrapping_div(b))
}

// Negative exponents give the truncated value of 1 / a^|b|.
fn pow_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let exp = ds_peek(forth, 0)?;
    let base = ds_peek(forth, 1)?;
    let val = if exp >= 0 {
        base.wrapping_pow(u32::try_from(exp).unwrap_or(u32::MAX))
    } else {
        match base {
            0 => return Err(ForthError::DivByZero),
            1 => 1,
            -1 if exp % 2 == 0 => 1,
            -1 => -1,
            _ => 0,
        }
    };
    ds_pop_2(forth)?;
    ds_push(forth, val)
}

fn eq_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, flag(a == b))
}

fn ne_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, flag(a != b))
}

fn less_than_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, flag(a < b))
}

fn greater_than_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, flag(a > b))
}

fn less_equal_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, flag(a <= b))
}

fn greater_equal_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, flag(a >= b))
}

fn and_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, a & b)
}

fn or_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, a | b)
}

fn xor_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    ds_push(forth, a ^ b)
}

fn invert_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let a = ds_pop(forth)?;
    ds_push(forth, !a)
}

// Shifts are logical; negative counts or counts past the cell width give 0.
fn lshift_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    let val = u32::try_from(b)
        .ok()
        .and_then(|b| (a as usize).checked_shl(b))
        .unwrap_or(0);
    ds_push(forth, val as Cell)
}

fn rshift_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (a, b) = ds_pop_2(forth)?;
    let val = u32::try_from(b)
        .ok()
        .and_then(|b| (a as usize).checked_shr(b))
        .unwrap_or(0);
    ds_push(forth, val as Cell)
}

fn dot_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let val = ds_pop(forth)?;
    let text = format_num(val, forth.memory.base());
    forth.output.push_str(&text);
    forth.output.push(' ');
    Ok(())
}

fn print_data_stack_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let base = forth.memory.base();
    let mut text = format!("<{}> ", forth.data_stack.len());
    for val in &forth.data_stack {
        text.push_str(&format_num(*val, base));
        text.push(' ');
    }
    forth.output.push_str(&text);
    Ok(())
}

fn cell_to_char(val: Cell) -> char {
    u32::try_from(val)
        .ok()
        .and_then(std::char::from_u32)
        .unwrap_or(std::char::REPLACEMENT_CHARACTER)
}

fn emit_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let val = ds_pop(forth)?;
    forth.output.push(cell_to_char(val));
    Ok(())
}

fn cr_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    forth.output.push('\n');
    Ok(())
}

fn space_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    forth.output.push(' ');
    Ok(())
}

// ( addr u -- )
// Stops early at a zero cell.
fn type_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let len = ds_pop_count(forth)?;
    let addr = ds_pop(forth)?;
    let text: String = forth
        .memory
        .slice(addr, len)?
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| cell_to_char(c))
        .collect();
    forth.output.push_str(&text);
    Ok(())
}

// Absorb the tokens of a string literal up to the one ending with `"`.
fn parse_string_literal(forth: &mut ForthMachine) -> Result<String, ForthError> {
    let tokens = forth
        .cursor()
        .take_until(input::is_string_end)
        .ok_or(ForthError::MissingTerminator("closing '\"'"))?;
    let mut text = tokens
        .iter()
        .map(|t| t.raw())
        .collect::<Vec<_>>()
        .join(" ");
    text.pop();
    Ok(text)
}

fn dot_quote_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let text = parse_string_literal(forth)?;
    forth.output.push_str(&text);
    Ok(())
}

// ( -- addr u )
fn s_quote_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let text = parse_string_literal(forth)?;
    let (addr, len) = forth
        .memory
        .alloc_str(&text)
        .ok_or(ForthError::AllocFailed(text.chars().count() as Cell + 1))?;
    ds_push(forth, addr as Cell)?;
    ds_push(forth, len as Cell)
}

// ( addr -- x )
fn fetch_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let addr = ds_pop(forth)?;
    let val = forth.memory.fetch(addr)?;
    ds_push(forth, val)
}

// ( x addr -- )
fn store_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let addr = ds_pop(forth)?;
    let val = ds_pop(forth)?;
    forth.memory.store(addr, val)
}

// ( n addr -- )
fn plus_store_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let addr = ds_pop(forth)?;
    let n = ds_pop(forth)?;
    let val = forth.memory.fetch(addr)?;
    forth.memory.store(addr, val.wrapping_add(n))
}

fn allot_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let cells = ds_pop(forth)?;
    if cells > 0 {
        forth
            .memory
            .alloc(cells as usize)
            .ok_or(ForthError::AllocFailed(cells))?;
    } else if cells < 0 && !forth.memory.dealloc(cells.unsigned_abs()) {
        return Err(ForthError::AllocFailed(cells));
    }
    Ok(())
}

fn here_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let here = forth.memory.here() as Cell;
    ds_push(forth, here)
}

fn unused_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let unused = forth.memory.unused() as Cell;
    ds_push(forth, unused)
}

fn variable_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let name = next_name(forth)?;
    forth.dictionary.check_name(name.word())?;
    let addr = forth.memory.alloc(1).ok_or(ForthError::AllocFailed(1))?;
    forth.memory.store(addr as Cell, 0)?;
    let defined = forth.dictionary.define_variable(name.word(), addr)?;
    forth.notices.push(Notice::defined(name.word(), defined));
    Ok(())
}

// ( x -- )
fn constant_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let name = next_name(forth)?;
    forth.dictionary.check_name(name.word())?;
    let val = ds_pop(forth)?;
    let defined = forth.dictionary.define_constant(name.word(), val)?;
    forth.notices.push(Notice::defined(name.word(), defined));
    Ok(())
}

// ( addr -- addr u )
fn count_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let addr = ds_peek(forth, 0)?;
    let len = forth.memory.zero_terminated_len(addr)?;
    ds_push(forth, len as Cell)
}

// ( addr u x -- )
fn fill_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let val = ds_pop(forth)?;
    let len = ds_pop_count(forth)?;
    let addr = ds_pop(forth)?;
    forth.memory.slice_mut(addr, len)?.fill(val);
    Ok(())
}

// ( src dst u -- )
fn move_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let len = ds_pop_count(forth)?;
    let dst = ds_pop(forth)?;
    let src = ds_pop(forth)?;
    forth.memory.copy(src, dst, len)
}

// Copy `len` cells to `dst` and terminate them with a zero cell.
fn place_at(forth: &mut ForthMachine, src: Cell, len: usize, dst: Cell) -> Result<(), ForthError> {
    forth.memory.check_range(src, len)?;
    forth.memory.check_range(dst, len + 1)?;
    forth.memory.copy(src, dst, len)?;
    forth.memory.store(dst + len as Cell, 0)
}

// ( src u dst -- )
fn place_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let dst = ds_pop(forth)?;
    let len = ds_pop_count(forth)?;
    let src = ds_pop(forth)?;
    place_at(forth, src, len, dst)
}

// ( src u dst -- )
// Appends after the string already at `dst`.
fn plus_place_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let dst = ds_pop(forth)?;
    let len = ds_pop_count(forth)?;
    let src = ds_pop(forth)?;
    let end = dst + forth.memory.zero_terminated_len(dst)? as Cell;
    place_at(forth, src, len, end)
}

fn base_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    ds_push(forth, BASE_ADDR as Cell)
}

fn hex_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    forth.memory.set_base(16);
    Ok(())
}

fn decimal_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    forth.memory.set_base(DEFAULT_BASE);
    Ok(())
}

// IF <then-body> [ ELSE <else-body> ] THEN
//
// The branch taken runs in its own frame, the caller resumes after THEN.
fn if_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let (else_pos, then_pos) = forth
        .cursor()
        .find_matching("if", "then", Some("else"))
        .ok_or(ForthError::MissingTerminator("\"then\""))?;
    let cond = ds_pop(forth)?;
    let cursor = forth.cursor();
    let branch = if cond != FORTH_FALSE {
        Some(cursor.sub(cursor.pos()..else_pos.unwrap_or(then_pos)))
    } else {
        else_pos.map(|else_pos| cursor.sub(else_pos + 1..then_pos))
    };
    cursor.jump(then_pos + 1);
    match branch {
        Some(branch) => forth.push_frame(branch, FrameKind::Branch),
        None => Ok(()),
    }
}

// ( limit start -- )
// DO <body> LOOP; without LOOP the body runs to the end of the current frame
// or to a `\` comment.
fn do_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let start = ds_pop(forth)?;
    let limit = ds_pop(forth)?;
    let cursor = forth.cursor();
    let (body_end, resume) = match cursor.find_matching("do", "loop", None) {
        Some((_, loop_pos)) => (loop_pos, loop_pos + 1),
        None => (cursor.code_end(), cursor.code_end()),
    };
    let body = cursor.sub(cursor.pos()..body_end);
    cursor.jump(resume);
    if start < limit {
        forth.push_frame(body, FrameKind::Loop { index: start, limit })
    } else {
        Ok(())
    }
}

fn loop_index(forth: &mut ForthMachine, nth: usize) -> Result<(), ForthError> {
    let index = forth
        .frames
        .iter()
        .rev()
        .filter_map(|frame| match frame.kind {
            FrameKind::Loop { index, .. } => Some(index),
            _ => None,
        })
        .nth(nth)
        .ok_or(ForthError::NoLoopIndex(forth.curr_word))?;
    ds_push(forth, index)
}

fn loop_i_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    loop_index(forth, 0)
}

fn loop_j_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    loop_index(forth, 1)
}

// : NAME <body> ;
// Switch to capturing, the dispatcher collects the body up to `;`.
fn colon_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let name = next_name(forth)?;
    forth.dictionary.check_name(name.word())?;
    forth.mode = Mode::Capturing(Capture {
        name: name.word().to_string(),
        body: Vec::new(),
    });
    Ok(())
}

fn words_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let names = forth.dictionary.user_names().join(" ");
    forth.output.push_str(&names);
    Ok(())
}

fn see_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let name = next_name(forth)?;
    let word = name.word();
    let text = if let Some(val) = forth.dictionary.find_constant(word) {
        format!("{} constant {}", format_num(val, forth.memory.base()), word)
    } else {
        match forth.dictionary.find_entry(word) {
            Some(Entry::User(body)) => {
                let body: Vec<_> = body.iter().map(|t| t.raw()).collect();
                format!(": {} {} ;", word, body.join(" "))
            }
            Some(Entry::Variable(addr)) => format!("variable {} ( {} )", word, addr),
            Some(Entry::Builtin(..)) => format!("{} is built-in", word),
            None => return Err(ForthError::UnknownWord(name.raw().to_string())),
        }
    };
    forth.output.push_str(&text);
    Ok(())
}

// ( n -- )
fn allocate_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    let n = ds_pop(forth)?;
    let max_depth = match usize::try_from(n) {
        Ok(n) if n >= 1 => n,
        _ => return Err(ForthError::DepthLimitTooSmall(n)),
    };
    forth.max_depth = max_depth;
    forth.notices.push(Notice::DepthLimit(max_depth));
    Ok(())
}

fn debug_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    forth.trace = !forth.trace;
    forth.notices.push(Notice::Trace(forth.trace));
    Ok(())
}

fn bye_builtin(forth: &mut ForthMachine) -> Result<(), ForthError> {
    forth.notices.push(Notice::Bye);
    Ok(())
}

#[test]
fn test_builtin_table() {
    for (name, builtin) in BUILTIN_WORDS.iter() {
        assert_eq!(name.to_lowercase(), *name);
        // Every builtin resolves back to a name in the table.
        assert!(BUILTIN_WORDS.iter().any(|(n, _)| *n == builtin.name()));
        assert!(builtin.arity() <= 3);
    }
    assert_eq!(Builtin::Ne.name(), "!=");
    assert_eq!(Builtin::Rot.arity(), 3);
    assert_eq!(Builtin::Pick.arity(), 1);
}

#[test]
fn test_underflow_leaves_stack() {
    let mut forth = ForthMachine::new();
    ds_push(&mut forth, 1).unwrap();
    ds_push(&mut forth, 2).unwrap();
    assert_eq!(
        Builtin::Rot.execute(&mut forth),
        Err(ForthError::DataStackEmpty("rot", 3))
    );
    assert_eq!(forth.data_stack(), &[1, 2]);
}
