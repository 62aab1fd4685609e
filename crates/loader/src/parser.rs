//! XML document → decoded instructions.
//!
//! Only the document structure is checked here. Argument text is kept
//! verbatim and validated by the VM when the instruction executes.

use crate::error::LoadError;
use ippcode_common::{ArgKind, Argument, Instruction, Opcode, ProgramError};
use roxmltree::{Document, Node};

const LANGUAGE: &str = "IPPcode18";

/// Argument element names in positional order.
const ARG_NAMES: [&str; 3] = ["arg1", "arg2", "arg3"];

/// Parse the program document into instructions in document order.
pub(crate) fn parse_document(xml: &str) -> Result<Vec<Instruction>, LoadError> {
    let doc = Document::parse(xml).map_err(|e| LoadError::Xml {
        message: e.to_string(),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "program" || root.attribute("language") != Some(LANGUAGE) {
        return Err(LoadError::InvalidRoot);
    }

    root.children()
        .filter(Node::is_element)
        .enumerate()
        .map(|(idx, node)| parse_instruction(node, idx + 1))
        .collect()
}

/// `position` is the 1-based index among `<program>`'s children, used only
/// before the order attribute is known.
fn parse_instruction(node: Node<'_, '_>, position: usize) -> Result<Instruction, LoadError> {
    expect_element(node, "program", "instruction")?;

    let order_text = node
        .attribute("order")
        .ok_or(LoadError::MissingAttribute {
            position,
            attribute: "order",
        })?;
    let order = parse_order(order_text)?;

    let mnemonic = node
        .attribute("opcode")
        .ok_or(LoadError::MissingAttribute {
            position,
            attribute: "opcode",
        })?;
    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| LoadError::UnknownOpcode {
        order,
        opcode: mnemonic.to_string(),
    })?;

    let args = parse_args(node, order, opcode)?;
    Ok(Instruction::new(order, opcode, args))
}

fn parse_order(text: &str) -> Result<usize, LoadError> {
    match text.trim().parse::<usize>() {
        Ok(order) if order > 0 => Ok(order),
        _ => Err(LoadError::InvalidOrder {
            text: text.to_string(),
        }),
    }
}

fn parse_args(node: Node<'_, '_>, order: usize, opcode: Opcode) -> Result<Vec<Argument>, LoadError> {
    let children: Vec<Node<'_, '_>> = node.children().filter(Node::is_element).collect();
    for child in &children {
        if !ARG_NAMES.contains(&child.tag_name().name()) {
            return Err(LoadError::UnexpectedElement {
                parent: "instruction".to_string(),
                found: child.tag_name().name().to_string(),
            });
        }
    }

    let expected = opcode.arity();
    if children.len() != expected {
        return Err(ProgramError::ArityMismatch {
            order,
            opcode: opcode.mnemonic(),
            expected,
            found: children.len(),
        }
        .into());
    }

    ARG_NAMES[..expected]
        .iter()
        .map(|&name| {
            let arg = children
                .iter()
                .find(|child| child.tag_name().name() == name)
                .ok_or_else(|| LoadError::MissingArgument {
                    order,
                    name: name.to_string(),
                })?;
            parse_arg(*arg, order, name)
        })
        .collect()
}

fn parse_arg(node: Node<'_, '_>, order: usize, name: &str) -> Result<Argument, LoadError> {
    let kind_name = node
        .attribute("type")
        .ok_or_else(|| LoadError::MissingArgumentType {
            order,
            name: name.to_string(),
        })?;
    let kind = ArgKind::from_name(kind_name).ok_or_else(|| LoadError::UnknownArgumentKind {
        order,
        kind: kind_name.to_string(),
    })?;

    Ok(match node.text() {
        Some(text) => Argument::new(kind, text),
        None => Argument::empty(kind),
    })
}

fn expect_element(node: Node<'_, '_>, parent: &str, name: &str) -> Result<(), LoadError> {
    if node.tag_name().name() == name {
        Ok(())
    } else {
        Err(LoadError::UnexpectedElement {
            parent: parent.to_string(),
            found: node.tag_name().name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<program language=\"IPPcode18\">{body}</program>")
    }

    #[test]
    fn parses_arguments_in_name_order() {
        let xml = wrap(
            r#"<instruction order="1" opcode="add">
                 <arg3 type="int">3</arg3>
                 <arg1 type="var">GF@x</arg1>
                 <arg2 type="int">2</arg2>
               </instruction>"#,
        );
        let instrs = parse_document(&xml).unwrap();
        assert_eq!(instrs.len(), 1);
        assert_eq!(instrs[0].opcode, Opcode::Add);
        assert_eq!(
            instrs[0].args,
            vec![Argument::var("GF@x"), Argument::int(2), Argument::int(3)]
        );
    }

    #[test]
    fn empty_argument_text_is_none() {
        let xml = wrap(r#"<instruction order="1" opcode="WRITE"><arg1 type="string"/></instruction>"#);
        let instrs = parse_document(&xml).unwrap();
        assert_eq!(instrs[0].args[0], Argument::empty(ArgKind::String));
    }

    #[test]
    fn entities_are_expanded() {
        let xml = wrap(
            r#"<instruction order="1" opcode="WRITE"><arg1 type="string">a&lt;b&amp;c</arg1></instruction>"#,
        );
        let instrs = parse_document(&xml).unwrap();
        assert_eq!(instrs[0].args[0], Argument::string("a<b&c"));
    }

    #[test]
    fn order_must_be_positive_integer() {
        for order in ["0", "-1", "x", ""] {
            let xml = wrap(&format!(r#"<instruction order="{order}" opcode="CREATEFRAME"/>"#));
            assert!(
                matches!(parse_document(&xml), Err(LoadError::InvalidOrder { .. })),
                "{order:?}"
            );
        }
    }

    #[test]
    fn wrong_root() {
        assert_eq!(
            parse_document("<program language=\"IPPcode19\"/>"),
            Err(LoadError::InvalidRoot)
        );
        assert_eq!(
            parse_document("<programme language=\"IPPcode18\"/>"),
            Err(LoadError::InvalidRoot)
        );
    }

    #[test]
    fn foreign_elements_are_rejected() {
        let xml = wrap(r#"<instr order="1" opcode="RETURN"/>"#);
        assert_eq!(
            parse_document(&xml),
            Err(LoadError::UnexpectedElement {
                parent: "program".into(),
                found: "instr".into()
            })
        );
        let xml = wrap(r#"<instruction order="1" opcode="RETURN"><arg4 type="int">1</arg4></instruction>"#);
        assert!(matches!(
            parse_document(&xml),
            Err(LoadError::UnexpectedElement { .. })
        ));
    }

    #[test]
    fn duplicated_arg_name_leaves_a_gap() {
        let xml = wrap(
            r#"<instruction order="1" opcode="MOVE">
                 <arg1 type="var">GF@x</arg1>
                 <arg1 type="int">1</arg1>
               </instruction>"#,
        );
        assert_eq!(
            parse_document(&xml),
            Err(LoadError::MissingArgument {
                order: 1,
                name: "arg2".into()
            })
        );
    }
}
