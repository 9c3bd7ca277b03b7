//! Textual instruction decoder.
//!
//! Parses one instruction per (non-blank, non-comment) line into a typed
//! [`Instruction`]. Grammar per form:
//!
//! ```text
//! add/sub/mulu rd, rs1, rs2
//! addi rd, rs1, imm
//! mov rd, rs1|imm
//! ld rd, imm(rs1)
//! st rs2, imm(rs1)      // store source first, per this dialect
//! loop imm
//! ```
//!
//! Registers are `xN` (general), `pN` (predicate), `LC`, `EC`. Immediates
//! accept decimal or `0x`-prefixed hex. Every failure path returns a
//! [`SchedError::Decode`] carrying the 0-based line index — this decoder
//! never panics on malformed input.

use crate::common::error::{Result, SchedError};
use crate::common::reg::Register;
use crate::isa::instruction::{Instruction, Opcode};

/// Decodes a full program: one instruction per non-blank, non-`#`-comment
/// line of `text`.
pub fn decode_program(text: &str) -> Result<Vec<Instruction>> {
    let mut out = Vec::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        out.push(decode_line(line, index)?);
    }
    Ok(out)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn err(index: usize, reason: impl Into<String>) -> SchedError {
    SchedError::Decode {
        index,
        reason: reason.into(),
    }
}

/// Decodes a single instruction line, already known to be non-empty.
fn decode_line(line: &str, index: usize) -> Result<Instruction> {
    let (mnemonic, rest) = match line.split_once(char::is_whitespace) {
        Some((m, r)) => (m, r.trim()),
        None => (line, ""),
    };

    match mnemonic {
        "add" | "sub" | "mulu" => decode_rrr(mnemonic, rest, index),
        "addi" => decode_addi(rest, index),
        "mov" => decode_mov(rest, index),
        "ld" => decode_ld(rest, index),
        "st" => decode_st(rest, index),
        "loop" => decode_loop(rest, index),
        other => Err(err(index, format!("unknown opcode '{other}'"))),
    }
}

fn split_operands(rest: &str, index: usize, expected: usize) -> Result<Vec<String>> {
    let parts: Vec<String> = rest.split(',').map(|s| s.trim().to_string()).collect();
    if parts.len() != expected || parts.iter().any(String::is_empty) {
        return Err(err(
            index,
            format!("expected {expected} comma-separated operands, got '{rest}'"),
        ));
    }
    Ok(parts)
}

fn parse_reg(token: &str, index: usize) -> Result<Register> {
    if token == "LC" {
        return Ok(Register::lc());
    }
    if token == "EC" {
        return Ok(Register::ec());
    }
    let mut chars = token.chars();
    let tag = chars.next().ok_or_else(|| err(index, "empty register operand"))?;
    let digits = chars.as_str();
    let idx: u32 = digits
        .parse()
        .map_err(|_| err(index, format!("malformed register '{token}'")))?;
    match tag {
        'x' => Ok(Register::general(idx)),
        'p' => Ok(Register::predicate(idx)),
        _ => Err(err(index, format!("malformed register '{token}'"))),
    }
}

fn parse_imm(token: &str, index: usize) -> Result<i64> {
    let token = token.trim();
    let (neg, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else {
        digits.parse::<i64>()
    }
    .map_err(|_| err(index, format!("malformed immediate '{token}'")))?;
    Ok(if neg { -value } else { value })
}

fn decode_rrr(mnemonic: &str, rest: &str, index: usize) -> Result<Instruction> {
    let ops = split_operands(rest, index, 3)?;
    let opcode = match mnemonic {
        "add" => Opcode::Add,
        "sub" => Opcode::Sub,
        "mulu" => Opcode::Mulu,
        _ => unreachable!(),
    };
    Ok(Instruction {
        opcode,
        rd: Some(parse_reg(&ops[0], index)?),
        rs1: Some(parse_reg(&ops[1], index)?),
        rs2: Some(parse_reg(&ops[2], index)?),
        imm: None,
    })
}

fn decode_addi(rest: &str, index: usize) -> Result<Instruction> {
    let ops = split_operands(rest, index, 3)?;
    Ok(Instruction {
        opcode: Opcode::Addi,
        rd: Some(parse_reg(&ops[0], index)?),
        rs1: Some(parse_reg(&ops[1], index)?),
        rs2: None,
        imm: Some(parse_imm(&ops[2], index)?),
    })
}

fn decode_mov(rest: &str, index: usize) -> Result<Instruction> {
    let ops = split_operands(rest, index, 2)?;
    let rd = parse_reg(&ops[0], index)?;
    let src = &ops[1];
    let starts_reg = src.starts_with('x') || src == "LC" || src == "EC" || src.starts_with('p');
    if starts_reg {
        Ok(Instruction {
            opcode: Opcode::Mov,
            rd: Some(rd),
            rs1: Some(parse_reg(src, index)?),
            rs2: None,
            imm: None,
        })
    } else {
        Ok(Instruction {
            opcode: Opcode::Mov,
            rd: Some(rd),
            rs1: None,
            rs2: None,
            imm: Some(parse_imm(src, index)?),
        })
    }
}

fn decode_ld(rest: &str, index: usize) -> Result<Instruction> {
    let (rd_tok, addr) = rest
        .split_once(',')
        .ok_or_else(|| err(index, format!("malformed 'ld' operands '{rest}'")))?;
    let (offset, base) = parse_addr(addr.trim(), index)?;
    Ok(Instruction {
        opcode: Opcode::Ld,
        rd: Some(parse_reg(rd_tok.trim(), index)?),
        rs1: Some(base),
        rs2: None,
        imm: Some(offset),
    })
}

fn decode_st(rest: &str, index: usize) -> Result<Instruction> {
    // `st rs2, offset(rs1)`: MEM[rs1 + offset] <- rs2 (store source first).
    let (src_tok, addr) = rest
        .split_once(',')
        .ok_or_else(|| err(index, format!("malformed 'st' operands '{rest}'")))?;
    let (offset, base) = parse_addr(addr.trim(), index)?;
    Ok(Instruction {
        opcode: Opcode::St,
        rd: None,
        rs1: Some(base),
        rs2: Some(parse_reg(src_tok.trim(), index)?),
        imm: Some(offset),
    })
}

fn parse_addr(addr: &str, index: usize) -> Result<(i64, Register)> {
    let open = addr
        .find('(')
        .ok_or_else(|| err(index, format!("malformed address operand '{addr}'")))?;
    if !addr.ends_with(')') {
        return Err(err(index, format!("malformed address operand '{addr}'")));
    }
    let offset_str = addr[..open].trim();
    let base_str = &addr[open + 1..addr.len() - 1];
    let offset = parse_imm(offset_str, index)?;
    let base = parse_reg(base_str.trim(), index)?;
    Ok((offset, base))
}

fn decode_loop(rest: &str, index: usize) -> Result<Instruction> {
    let imm = parse_imm(rest.trim(), index)?;
    Ok(Instruction {
        opcode: Opcode::Loop,
        rd: None,
        rs1: None,
        rs2: None,
        imm: Some(imm),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::reg::RegKind;

    #[test]
    fn decodes_rrr_forms() {
        let prog = decode_program("add x1, x2, x3\nmulu x4, x5, x6").unwrap();
        assert_eq!(prog[0].opcode, Opcode::Add);
        assert_eq!(prog[1].opcode, Opcode::Mulu);
        assert_eq!(prog[0].rd.unwrap().kind(), RegKind::General);
    }

    #[test]
    fn decodes_mov_reg_and_imm() {
        let prog = decode_program("mov x1, x2\nmov x3, 7\nmov x4, 0x10").unwrap();
        assert!(prog[0].rs1.is_some() && prog[0].imm.is_none());
        assert_eq!(prog[1].imm, Some(7));
        assert_eq!(prog[2].imm, Some(16));
    }

    #[test]
    fn decodes_ld_st_with_offset() {
        let prog = decode_program("ld x1, 0(x2)\nst x3, 0x8(x4)").unwrap();
        assert_eq!(prog[0].imm, Some(0));
        assert_eq!(prog[1].imm, Some(8));
        assert_eq!(prog[1].rs2.unwrap().to_string(), "x3");
        assert_eq!(prog[1].rs1.unwrap().to_string(), "x4");
    }

    #[test]
    fn decodes_loop_and_lc_ec() {
        let prog = decode_program("mov LC, x1\nloop 2").unwrap();
        assert_eq!(prog[0].rd.unwrap().kind(), RegKind::Lc);
        assert_eq!(prog[1].opcode, Opcode::Loop);
        assert_eq!(prog[1].imm, Some(2));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let prog = decode_program("# a comment\n\nadd x1, x2, x3  # trailing\n").unwrap();
        assert_eq!(prog.len(), 1);
    }

    #[test]
    fn rejects_unknown_opcode() {
        let err = decode_program("frob x1, x2, x3").unwrap_err();
        assert!(matches!(err, SchedError::Decode { index: 0, .. }));
    }

    #[test]
    fn rejects_malformed_register() {
        let err = decode_program("add y1, x2, x3").unwrap_err();
        assert!(matches!(err, SchedError::Decode { .. }));
    }
}
