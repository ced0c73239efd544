use super::*;

const GRID: GridSize = GridSize { max_row: 95, max_col: 126 };

fn name(src: &str, snk: &str) -> Option<String> {
    get_pip_class_name(src, snk, GRID)
}

#[test]
fn test_output_to_input() {
    assert_eq!(name("R1C1_F0", "R1C1_A0"), Some("f_to_a".into()));
    assert_eq!(name("R1C1_JQ3", "R1C1_JA0"), Some("jq_to_ja".into()));
    /* The J prefix only applies to the A/B/C/D/M inputs */
    assert_eq!(name("R1C1_JQ3", "R1C1_JCLK0"), None);
    assert_eq!(name("R1C1_Q1", "R1C1_LSR1"), Some("q_to_lsr".into()));
}

#[test]
fn test_denormalized_wires_have_no_class() {
    assert_eq!(name("R1C1_H06_0100", "R1C1_A0"), None);
    assert_eq!(name("R1C1_F0", "R1C1_V02N0700"), None);
    /* Canonical ends of long wires are fine */
    assert!(!is_denorm("H06E0103"));
    assert!(!is_denorm("V02S0501"));
    assert!(is_denorm("H06E0104"));
}

#[test]
fn test_internal_classes() {
    assert_eq!(name("R1C1_DI0_SLICE", "R1C1_DI0"), Some("slice_internal".into()));
    assert_eq!(name("R1C1_MUXCLK0", "R1C1_CLK0"), Some("slice_internal".into()));
    assert_eq!(name("R3C4_JDIA0_EBR", "R3C4_JDIA0"), Some("ebr_internal".into()));
    assert_eq!(name("R2C3_ALU0", "R2C3_A0"), Some("dsp_internal".into()));
    assert_eq!(name("R2C3_F0", "R2C3_JMULTA0"), Some("dsp_internal".into()));
    assert_eq!(name("R2C3_F0", "R2C3_PRADDA0"), Some("dsp_internal".into()));
    assert_eq!(name("R2C3_TESTIN0", "R2C3_A0"), None);
}

#[test]
fn test_precedence_follows_rule_order() {
    /* A slice-internal wire that also mentions ALU is slice-internal */
    assert_eq!(name("R1C1_ALU0_SLICE", "R1C1_A0"), Some("slice_internal".into()));
    /* Denormalized beats everything */
    assert_eq!(name("R1C1_H06W0300", "R1C1_F0_SLICE"), None);

    let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
    assert_eq!(names.first(), Some(&"denormalized"));
    assert_eq!(names.last(), Some(&"lsr_to_muxlsr"));
}

#[test]
fn test_span_to_input() {
    assert_eq!(name("R5C5_H02E0701", "R5C6_A0"), Some("span2he_to_a_e1".into()));
    assert_eq!(name("R5C5_V06S0003", "R8C4_JB1"), Some("span6vs_to_jb_s3w1".into()));
    assert_eq!(name("R5C5_H00R0000", "R5C5_M0"), Some("span0hr_to_m".into()));
    assert_eq!(name("R5C5_HPBX0000", "R5C5_CLK1"), Some("global_to_clk".into()));
    assert_eq!(name("R5C5_BOUNCE0", "R5C5_A0"), None);
}

#[test]
fn test_to_span() {
    assert_eq!(name("R5C5_F0", "R4C5_V02N0701"), Some("f_to_span2vn_n1".into()));
    assert_eq!(name("R5C5_H06E0103", "R5C8_H06E0103"), Some("span6he_to_span6he_e3".into()));
    assert_eq!(name("R5C5_HPBX0100", "R5C5_H00L0000"), Some("global_to_span0hl".into()));
    assert_eq!(name("R5C5_BOUNCE0", "R5C5_H00L0000"), None);
    assert_eq!(name("R5C5_JCE0", "R5C5_H00L0000"), None);
}

#[test]
fn test_lsr_to_muxlsr() {
    assert_eq!(name("R1C1_LSR0", "R1C1_MUXLSR"), Some("lsr_to_muxlsr".into()));
}

#[test]
fn test_unmatched_and_malformed() {
    assert_eq!(name("R1C1_DI0", "R1C1_DUMMY"), None);
    assert_eq!(name("NOLOCATION", "R1C1_A0"), None);
}

#[test]
fn test_non_ascii_digits_are_not_pin_indices() {
    assert_eq!(name("R1C1_F\u{0663}", "R1C1_A0"), None);
    assert_eq!(name("R1C1_F0", "R1C1_A\u{0663}"), None);
    assert_eq!(name("R1C1_H0\u{0663}E0103", "R1C1_A0"), None);
    assert_eq!(pos_from_name("R\u{0663}C1", GRID), None);
    assert_eq!(get_span("H06\u{00e9}0103"), None);
}

#[test]
fn test_get_span() {
    assert_eq!(get_span("H06E0103"), Some("span6he".into()));
    assert_eq!(get_span("V01N0001"), Some("span1vn".into()));
    assert_eq!(get_span("HPBX0000"), None);
    assert_eq!(get_span("H06"), None);
}

#[test]
fn test_format_rel() {
    assert_eq!(format_rel("R5C5", "R5C5", GRID), Some("".into()));
    assert_eq!(format_rel("R5C5", "R3C5", GRID), Some("_n2".into()));
    assert_eq!(format_rel("R5C5", "R7C2", GRID), Some("_s2w3".into()));
    assert_eq!(format_rel("R5C5", "R5C9", GRID), Some("_e4".into()));
    assert_eq!(format_rel("R0C0", "BR", GRID), Some("_s95e126".into()));
    assert_eq!(format_rel("R5C5", "XYZ", GRID), None);
}

#[test]
fn test_registry_indices() {
    let mut reg = PipClassRegistry::default();
    assert_eq!(reg.get(DEFAULT_CLASS), Some(0));
    assert_eq!(reg.register("f_to_a"), 1);
    assert_eq!(reg.register("span6he_to_a"), 2);
    assert_eq!(reg.register("f_to_a"), 1);
    assert_eq!(reg.register(DEFAULT_CLASS), 0);
    assert_eq!(reg.len(), 3);

    assert_eq!(reg.index_for(Some("f_to_a")), 1);
    assert_eq!(reg.index_for(Some("unknown")), 0);
    assert_eq!(reg.index_for(None), 0);

    assert_eq!(reg.classify("R1C1_F0", "R1C1_A0", GRID), 1);
    assert_eq!(reg.classify("R1C1_Q0", "R1C1_A0", GRID), 0);
    assert_eq!(reg.names().collect::<Vec<_>>(), vec!["default", "f_to_a", "span6he_to_a"]);
}

#[test]
fn test_reclassify_arc() {
    use crate::chipdb::ArcClass::*;
    assert_eq!(reclassify_arc(Standard, "R1C1_A", "R1C1_PCSA_TX"), Fixed);
    assert_eq!(reclassify_arc(Standard, "R1C1_JDCU0", "R1C1_B"), Fixed);
    assert_eq!(reclassify_arc(Standard, "R1C1_A", "R1C1_B"), Standard);
    assert_eq!(reclassify_arc(Fixed, "R1C1_A", "R1C1_B"), Fixed);
}
