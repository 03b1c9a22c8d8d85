use pretty_assertions::assert_eq;

use yuris_nls::{Decoder, Encoding};
use yuris_script::crypt::decrypt_container;
use yuris_script::{decompile, decompile_lines, DecompileOptions, ErrorKind, Mnemonic};

const SCRIPT_INDEX: u16 = 3;

fn nls() -> Decoder {
    Decoder::new(Encoding::ShiftJis)
}

fn op(code: u8, operand: &[u8]) -> Vec<u8> {
    let mut out = vec![code];
    out.extend_from_slice(&(operand.len() as u16).to_le_bytes());
    out.extend_from_slice(operand);
    out
}

fn var(code: u8, prefix: u8, id: u16) -> Vec<u8> {
    let mut operand = vec![prefix];
    operand.extend_from_slice(&id.to_le_bytes());
    op(code, &operand)
}

fn byte_lit(v: u8) -> Vec<u8> {
    op(0x42, &[v])
}

fn i32_lit(v: i32) -> Vec<u8> {
    op(0x49, &v.to_le_bytes())
}

struct Attr {
    id: u16,
    sub_type: u8,
    value: Vec<u8>,
}

fn attr(id: u16, value: Vec<u8>) -> Attr {
    Attr { id, sub_type: 0, value }
}

fn build_yst(commands: &[(u8, u8)], attrs: &[Attr], key: u32) -> Vec<u8> {
    let mut desc = Vec::new();
    let mut values = Vec::new();
    for a in attrs {
        desc.extend_from_slice(&a.id.to_le_bytes());
        desc.extend_from_slice(&[0x03, a.sub_type]);
        desc.extend_from_slice(&(a.value.len() as u32).to_le_bytes());
        desc.extend_from_slice(&(values.len() as u32).to_le_bytes());
        values.extend_from_slice(&a.value);
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"YSTB");
    out.extend_from_slice(&481u32.to_le_bytes());
    out.extend_from_slice(&(commands.len() as u32).to_le_bytes());
    out.extend_from_slice(&(commands.len() as u32 * 4).to_le_bytes());
    out.extend_from_slice(&(desc.len() as u32).to_le_bytes());
    out.extend_from_slice(&(values.len() as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    for &(opcode, count) in commands {
        out.extend_from_slice(&[opcode, count, 0, 0]);
    }
    out.extend_from_slice(&desc);
    out.extend_from_slice(&values);

    decrypt_container(&mut out, key).unwrap();
    out
}

fn build_ysl(labels: &[(&str, u32, u16)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"YSLB");
    out.extend_from_slice(&481u32.to_le_bytes());
    out.extend_from_slice(&(labels.len() as u32).to_le_bytes());
    out.extend(std::iter::repeat(0u8).take(0x400));
    for (i, (name, offset, script)) in labels.iter().enumerate() {
        let raw = nls().encode_owned(name);
        out.push(raw.len() as u8);
        out.extend_from_slice(&raw);
        out.extend_from_slice(&(i as u32).to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&script.to_le_bytes());
        out.extend_from_slice(&[0, 0]);
    }
    out
}

fn build_ycd(commands: &[(&str, &[&str])]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"YSCD");
    out.extend_from_slice(&481u32.to_le_bytes());
    out.extend_from_slice(&(commands.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    for (name, attrs) in commands {
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        out.push(attrs.len() as u8);
        for a in attrs.iter() {
            out.extend_from_slice(a.as_bytes());
            out.push(0);
            out.extend_from_slice(&[0; 4]);
        }
    }
    out
}

const IF: u8 = 0;
const IFEND: u8 = 1;
const LET: u8 = 2;
const MES: u8 = 3;
const RETURN: u8 = 4;
const LOOP: u8 = 5;
const LOOPEND: u8 = 6;
const END: u8 = 7;
const INT: u8 = 8;

fn definition() -> Vec<u8> {
    build_ycd(&[
        ("IF", &["CONDITION"]),
        ("IFEND", &[]),
        ("LET", &["VAR", "SET"]),
        ("MES", &["TEXT"]),
        ("RETURN", &[]),
        ("LOOP", &["SET"]),
        ("LOOPEND", &[]),
        ("END", &[]),
        ("INT", &["VAR", "SET"]),
    ])
}

fn scene(key: u32) -> Vec<u8> {
    let text = nls().encode_owned("\"こんにちは\"");
    let commands = [
        (INT, 2),
        (LET, 2),
        (IF, 1),
        (MES, 1),
        (IFEND, 0),
        (LOOP, 1),
        (MES, 1),
        (LOOPEND, 0),
        (RETURN, 0),
        (END, 0),
    ];
    let attrs = [
        attr(0, var(0x48, b'@', 1)),
        attr(1, byte_lit(0)),
        Attr {
            id: 0,
            sub_type: 1,
            value: var(0x48, b'@', 1),
        },
        attr(1, byte_lit(2)),
        attr(0, [var(0x48, b'@', 1), i32_lit(5), op(0x3D, &[])].concat()),
        attr(0, op(0x4D, &text)),
        attr(0, byte_lit(255)),
        attr(
            0,
            [
                var(0x56, b'$', 2),
                i32_lit(0),
                op(0x2C, &[]),
                i32_lit(1),
                op(0x29, &[0]),
            ]
            .concat(),
        ),
    ];
    build_yst(&commands, &attrs, key)
}

fn labels() -> Vec<u8> {
    build_ysl(&[
        ("TAIL", 10, SCRIPT_INDEX),
        ("OTHER_SCENE", 0, SCRIPT_INDEX + 1),
        ("MAIN", 0, SCRIPT_INDEX),
    ])
}

fn options() -> DecompileOptions {
    DecompileOptions {
        script_index: SCRIPT_INDEX,
        encoding: Encoding::ShiftJis,
    }
}

const EXPECTED: &str = "\
#=MAIN
{
  INT[@var1]
  @var1 += 2
  IF[@var1 == 5]
  {
    MES[TEXT=\"こんにちは\"]
  }
  IFEND[]
  LOOP[]
  {
    MES[TEXT=$var2(0, 1)]
  }
  LOOPEND[]
  RETURN[]
}

END[]

#=TAIL

";

#[test]
fn decompiles_encrypted_scene() {
    let out = decompile(&scene(0x2f5c_a1e3), &labels(), &definition(), &options()).unwrap();
    assert_eq!(out, EXPECTED);
}

#[test]
fn plaintext_scene_gives_same_text() {
    let out = decompile(&scene(0), &labels(), &definition(), &options()).unwrap();
    assert_eq!(out, EXPECTED);
}

#[test]
fn tree_shape_of_scene() {
    let lines = decompile_lines(&scene(0x0bad_f00d), &labels(), &definition(), &options()).unwrap();
    let top: Vec<_> = lines.iter().map(|l| l.mnemonic.clone()).collect();
    assert_eq!(top, vec![Mnemonic::Label, Mnemonic::End, Mnemonic::Label]);

    let main = &lines[0];
    assert!(main.visited);
    assert_eq!(main.children.len(), 7);
    assert_eq!(main.children[6].mnemonic, Mnemonic::Return);
    assert_eq!(main.children[2].children[0].values, vec!["\"こんにちは\"".to_string()]);
}

#[test]
fn labels_of_other_scripts_are_ignored() {
    let opts = DecompileOptions {
        script_index: SCRIPT_INDEX + 1,
        ..options()
    };
    let lines = decompile_lines(&scene(0), &labels(), &definition(), &opts).unwrap();
    assert_eq!(lines[0].mnemonic, Mnemonic::Label);
    assert_eq!(lines[0].value(0), Some("OTHER_SCENE"));
    assert!(lines.iter().all(|l| l.value(0) != Some("MAIN")));
}

#[test]
fn swapped_resources_are_format_errors() {
    let err = decompile(&labels(), &labels(), &definition(), &options()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    let err = decompile(&scene(0), &definition(), &definition(), &options()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn truncated_scene_is_a_bounds_error() {
    let mut bytes = scene(0x1234_5678);
    bytes.truncate(bytes.len() - 3);
    let err = decompile(&bytes, &labels(), &definition(), &options()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bounds);
}
