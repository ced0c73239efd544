use super::*;

fn written<F>(f: F) -> String where F: FnOnce(&mut BbaWriter<Vec<u8>>) -> Result<()> {
    let mut bba = BbaWriter::new(Vec::new());
    f(&mut bba).unwrap();
    String::from_utf8(bba.finish().unwrap()).unwrap()
}

#[test]
fn test_directive_text() {
    let text = written(|bba| {
        bba.pre("#include \"nextpnr.h\"")?;
        bba.push("chipdb_blob_25k")?;
        bba.reference("chip_info", "chip_info")?;
        bba.label("loc0_pips", Some("PipInfoPOD"))?;
        bba.u16(65535, "src.x")?;
        bba.u8(1, "")?;
        bba.string("R1C1_F0", "name")?;
        bba.label("chip_info", None)?;
        bba.u32(7, "width")?;
        bba.pop()?;
        bba.post("NEXTPNR_NAMESPACE_END")
    });

    let expected = concat!(
        "pre #include \"nextpnr.h\"\n",
        "push chipdb_blob_25k\n",
        "ref chip_info chip_info\n",
        "label loc0_pips PipInfoPOD\n",
        "u16 65535 src.x\n",
        "u8 1\n",
        "str |R1C1_F0| name\n",
        "label chip_info\n",
        "u32 7 width\n",
        "pop\n",
        "post NEXTPNR_NAMESPACE_END\n",
    );
    assert_eq!(text, expected);
}

#[test]
fn test_reference_if_uses_null_label() {
    let text = written(|bba| {
        bba.reference_if(0, "loc0_bels", "bel_data")?;
        bba.reference_if(2, "loc0_wires", "wire_data")
    });
    assert_eq!(text, "ref None bel_data\nref loc0_wires wire_data\n");
}

#[test]
fn test_string_rejects_delimiter() {
    let mut bba = BbaWriter::new(Vec::new());
    assert!(matches!(bba.string("a|b", "name"), Err(Error::Bba(_))));
}

#[test]
fn test_duplicate_label_in_scope() {
    let mut bba = BbaWriter::new(Vec::new());
    bba.label("x", None).unwrap();
    assert!(bba.label("x", None).is_err());

    /* Same name in a nested scope is a different label */
    bba.push("inner").unwrap();
    bba.label("x", None).unwrap();
    bba.pop().unwrap();
}

#[test]
fn test_unbalanced_scopes() {
    let mut bba = BbaWriter::new(Vec::new());
    assert!(bba.pop().is_err());

    let mut bba = BbaWriter::new(Vec::new());
    bba.push("a").unwrap();
    assert!(bba.finish().is_err());
}

#[test]
fn test_parse_line() {
    assert_eq!(
        parse_line("label loc0_pips PipInfoPOD").unwrap(),
        Directive::Label { name: "loc0_pips".into(), ltype: Some("PipInfoPOD".into()) }
    );
    assert_eq!(
        parse_line("str |CABGA381| name").unwrap(),
        Directive::Str { text: "CABGA381".into(), comment: Some("name".into()) }
    );
    assert_eq!(
        parse_line("str || function_name").unwrap(),
        Directive::Str { text: "".into(), comment: Some("function_name".into()) }
    );
    assert_eq!(
        parse_line("u32 12 num_pips").unwrap().scalar(),
        Some(12)
    );
    assert_eq!(parse_line("pop").unwrap(), Directive::Pop);
    assert!(parse_line("u32 x").is_err());
    assert!(parse_line("bogus 1").is_err());
}

#[test]
fn test_closure_accepts_forward_references() {
    let text = written(|bba| {
        bba.push("blob")?;
        bba.reference("chip_info", "chip_info")?;
        bba.reference("None", "nothing")?;
        bba.label("chip_info", None)?;
        bba.u32(1, "width")?;
        bba.pop()
    });
    let stream = parse_stream(&text).unwrap();
    check_closure(&stream).unwrap();
}

#[test]
fn test_closure_rejects_dangling_reference() {
    let stream = parse_stream("push a\nref missing\npop\n").unwrap();
    assert!(check_closure(&stream).is_err());
}

#[test]
fn test_closure_scope_visibility() {
    /* A label in a closed sibling scope is not visible */
    let stream = parse_stream("push a\nlabel x\npop\npush b\nref x\npop\n").unwrap();
    assert!(check_closure(&stream).is_err());

    /* A label in an enclosing scope is */
    let stream = parse_stream("label x\npush b\nref x\npop\n").unwrap();
    check_closure(&stream).unwrap();

    let stream = parse_stream("push a\nlabel x\n").unwrap();
    assert!(check_closure(&stream).is_err());
}
