use super::*;
use crate::language::{lexer::lex, parser::parse, typecheck::check_program};

fn compile(source: &str) -> GeneratedMethod {
    let tokens = lex(source).expect("lex");
    let program = parse(&tokens).expect("parse");
    let types = check_program(&program).expect("type check");
    generate_program(&program, types).expect("generate")
}

fn index_of(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|line| line == needle)
        .unwrap_or_else(|| panic!("`{needle}` not found in {lines:#?}"))
}

fn count_of(lines: &[String], needle: &str) -> usize {
    lines.iter().filter(|line| line.as_str() == needle).count()
}

#[test]
fn declaration_loads_value_and_stores_to_first_free_slot() {
    let method = compile("a = 1;");
    assert_eq!(method.instructions, vec!["ldc 1", "istore 1"]);
    assert_eq!(method.locals, 2);
    assert_eq!(method.max_stack, 1);
}

#[test]
fn limits_are_the_first_two_body_lines() {
    let method = compile("print(1 + 2);");
    let lines = method.body_lines();
    assert_eq!(lines[0], ".limit locals 1");
    assert_eq!(lines[1], ".limit stack 3");
}

#[test]
fn shadowed_variable_uses_a_distinct_slot() {
    let method = compile("a = 1; { a = 2; print(a); } print(a);");
    let lines = &method.instructions;

    assert_eq!(count_of(lines, "istore 1"), 1);
    assert_eq!(count_of(lines, "istore 2"), 1);
    // Inner print reads the inner slot, outer print the outer slot.
    assert!(index_of(lines, "iload 2") < index_of(lines, "iload 1"));
    assert_eq!(method.locals, 3);
}

#[test]
fn mixed_arithmetic_widens_only_the_int_operand() {
    let method = compile("a = 1 + 2.5;");
    assert_eq!(
        method.instructions,
        vec!["ldc 1", "i2d", "ldc2_w 2.5", "dadd", "dstore 1"]
    );
    // ldc(1) + i2d(1) + ldc2_w(2) pushed before the add folds.
    assert_eq!(method.max_stack, 4);
    assert_eq!(method.locals, 3);
}

#[test]
fn same_type_operands_need_no_widening() {
    let method = compile("a = 1 + 2;");
    assert_eq!(count_of(&method.instructions, "i2d"), 0);
    assert_eq!(method.instructions.last().unwrap(), "istore 1");
}

#[test]
fn double_declaration_takes_two_slots() {
    let method = compile("a = 1.5; b = 2.5;");
    let lines = &method.instructions;
    assert_eq!(count_of(lines, "dstore 1"), 1);
    assert_eq!(count_of(lines, "dstore 3"), 1);
    assert_eq!(method.locals, 5);
}

#[test]
fn redeclaration_with_new_type_abandons_the_old_slot() {
    let method = compile("a = 1; a = 2.5;");
    let lines = &method.instructions;
    assert_eq!(count_of(lines, "istore 1"), 1);
    assert_eq!(count_of(lines, "dstore 2"), 1);
    assert_eq!(method.locals, 4);
}

#[test]
fn print_calls_println_with_the_operand_descriptor() {
    let int_method = compile("print(1);");
    assert!(
        int_method
            .instructions
            .contains(&"invokevirtual java/io/PrintStream/println(I)V".to_string())
    );

    let double_method = compile("print(1.5);");
    assert!(
        double_method
            .instructions
            .contains(&"invokevirtual java/io/PrintStream/println(D)V".to_string())
    );

    let bool_method = compile("print(true);");
    assert!(
        bool_method
            .instructions
            .contains(&"invokevirtual java/io/PrintStream/println(Z)V".to_string())
    );
}

#[test]
fn print_reserves_a_stack_slot_for_the_stream() {
    let method = compile("print(1.5);");
    // getstatic(1) + ldc2_w(2).
    assert_eq!(method.max_stack, 3);
}

#[test]
fn comparison_normalizes_to_zero_or_one() {
    let method = compile("a = 1 < 2;");
    assert_eq!(
        method.instructions,
        vec![
            "ldc 1",
            "ldc 2",
            "if_icmplt then_c_1",
            "else_c_1:",
            "iconst_0",
            "goto end_c_1",
            "then_c_1:",
            "iconst_1",
            "end_c_1:",
            "istore 1",
        ]
    );
}

#[test]
fn double_comparison_collapses_through_dcmpg() {
    let method = compile("a = 1.5 < 2;");
    let lines = &method.instructions;
    assert_eq!(count_of(lines, "i2d"), 1);
    let dcmpg = index_of(lines, "dcmpg");
    assert_eq!(lines[dcmpg + 1], "iconst_0");
    assert_eq!(lines[dcmpg + 2], "if_icmplt then_c_1");
    // Boolean result still fits one slot.
    assert_eq!(lines.last().unwrap(), "istore 1");
}

#[test]
fn logical_operators_emit_bitwise_instructions() {
    let and_method = compile("a = true && false;");
    assert_eq!(
        and_method.instructions,
        vec!["iconst_1", "iconst_0", "iand", "istore 1"]
    );

    let or_method = compile("a = true || false;");
    assert!(or_method.instructions.contains(&"ior".to_string()));
}

#[test]
fn logical_negation_is_add_one_mod_two() {
    let method = compile("a = !true;");
    assert_eq!(
        method.instructions,
        vec!["iconst_1", "iconst_1", "iadd", "iconst_2", "irem", "istore 1"]
    );
}

#[test]
fn double_negation_applies_the_flip_twice() {
    let method = compile("a = !!true;");
    let flip = ["iconst_1", "iadd", "iconst_2", "irem"];
    let mut expected: Vec<String> = vec!["iconst_1".into()];
    expected.extend(flip.iter().map(|s| s.to_string()));
    expected.extend(flip.iter().map(|s| s.to_string()));
    expected.push("istore 1".into());
    assert_eq!(method.instructions, expected);

    // (v + 1) mod 2 applied twice is the identity on {0, 1}.
    for v in [0, 1] {
        assert_eq!((((v + 1) % 2) + 1) % 2, v);
    }
}

#[test]
fn numeric_negation_uses_the_typed_mnemonic() {
    let method = compile("a = -1.5; b = -2;");
    let lines = &method.instructions;
    assert!(index_of(lines, "dneg") < index_of(lines, "ineg"));
}

#[test]
fn if_else_covers_every_path_exactly_once() {
    let method = compile("if (true) print(1); else print(2);");
    let lines = &method.instructions;

    let branch = index_of(lines, "ifne then_if_1");
    let else_label = index_of(lines, "else_if_1:");
    let goto_end = index_of(lines, "goto end_if_1");
    let then_label = index_of(lines, "then_if_1:");
    let end_label = index_of(lines, "end_if_1:");
    assert!(branch < else_label);
    assert!(else_label < goto_end);
    assert!(goto_end < then_label);
    assert!(then_label < end_label);

    // Else code sits between its label and the jump over the then code.
    let else_print = index_of(lines, "ldc 2");
    assert!(else_label < else_print && else_print < goto_end);
    let then_print = index_of(lines, "ldc 1");
    assert!(then_label < then_print && then_print < end_label);
}

#[test]
fn if_without_else_still_emits_the_full_label_family() {
    let method = compile("if (true) print(1);");
    let lines = &method.instructions;
    assert!(index_of(lines, "else_if_1:") < index_of(lines, "goto end_if_1"));
    assert!(index_of(lines, "then_if_1:") < index_of(lines, "end_if_1:"));
}

#[test]
fn while_loop_jumps_back_to_the_condition() {
    let method = compile("a = true; while (a) a = false;");
    let lines = &method.instructions;

    let before = index_of(lines, "before_w_1:");
    let branch = index_of(lines, "ifne then_w_1");
    let escape = index_of(lines, "goto end_w_1");
    let then_label = index_of(lines, "then_w_1:");
    let back = index_of(lines, "goto before_w_1");
    let end = index_of(lines, "end_w_1:");
    assert!(before < branch && branch < escape);
    assert!(escape < then_label && then_label < back && back < end);
}

#[test]
fn for_loop_reuses_the_counter_slot_in_the_update() {
    let method = compile("for (i = 0; i < 3; i = i + 1) print(i);");
    let lines = &method.instructions;

    // Initializer and update both store to the same slot.
    assert_eq!(count_of(lines, "istore 1"), 2);
    assert!(index_of(lines, "before_f_1:") < index_of(lines, "then_f_1:"));
    assert!(index_of(lines, "goto before_f_1") < index_of(lines, "end_f_1:"));
    // The condition's comparison drew its own label id.
    assert!(lines.contains(&"if_icmplt then_c_2".to_string()));
}

#[test]
fn for_update_may_retype_the_counter() {
    let method = compile("for (i = 0; i < 3; i = 1.5) print(i);");
    let lines = &method.instructions;
    assert!(lines.contains(&"istore 1".to_string()));
    assert!(lines.contains(&"dstore 2".to_string()));
    assert_eq!(method.locals, 4);
}

#[test]
fn loop_variable_slot_is_freed_by_name_not_by_slot() {
    // After the for scope closes, a new declaration gets a fresh slot; the
    // cursor never rewinds.
    let method = compile("for (i = 0; i < 3; i = i + 1) print(i); a = 1;");
    assert!(method.instructions.contains(&"istore 2".to_string()));
}

#[test]
fn every_control_flow_construct_gets_its_own_label_family() {
    let method = compile("if (true) print(1); if (true) print(2); while (false) print(3);");
    let lines = &method.instructions;
    assert_eq!(count_of(lines, "then_if_1:"), 1);
    assert_eq!(count_of(lines, "then_if_2:"), 1);
    assert_eq!(count_of(lines, "then_w_3:"), 1);
}

#[test]
fn nested_constructs_of_the_same_kind_do_not_collide() {
    let method = compile("if (true) if (false) print(1); else print(2); else print(3);");
    let lines = &method.instructions;
    assert_eq!(count_of(lines, "then_if_1:"), 1);
    assert_eq!(count_of(lines, "then_if_2:"), 1);
    assert_eq!(count_of(lines, "end_if_1:"), 1);
    assert_eq!(count_of(lines, "end_if_2:"), 1);
}

#[test]
fn label_ids_are_unique_across_the_whole_unit() {
    let method = compile(
        "for (i = 0; i < 2; i = i + 1) { while (i < 1) { i = i + 1; } if (i == 1) print(i); }",
    );
    let mut labels: Vec<&String> = method
        .instructions
        .iter()
        .filter(|line| line.ends_with(':'))
        .collect();
    let total = labels.len();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), total, "duplicate label in {labels:#?}");
}

#[test]
fn stack_limit_covers_the_deepest_statement() {
    // Worst statement: getstatic(1) + 1.5(2) + i2d'd int(2) = 5.
    let method = compile("a = 1; print(1.5 + a);");
    assert_eq!(method.max_stack, 5);
}

#[test]
fn parenthesized_expressions_are_transparent() {
    let method = compile("a = (1);");
    assert_eq!(method.instructions, vec!["ldc 1", "istore 1"]);
}

#[test]
fn whole_double_literals_keep_a_decimal_point() {
    let method = compile("a = 2.0;");
    assert_eq!(method.instructions[0], "ldc2_w 2.0");
}

#[test]
fn missing_annotation_is_an_internal_error() {
    let tokens = lex("a = 1;").expect("lex");
    let program = parse(&tokens).expect("parse");
    let err = generate_program(&program, TypeMap::new()).expect_err("should fail");
    assert!(matches!(err, CompileError::Internal { .. }));
}

#[test]
fn generation_is_deterministic_over_an_unmodified_tree() {
    let tokens = lex("a = 1; for (i = 0; i < 3; i = i + 1) print(a + i);").expect("lex");
    let program = parse(&tokens).expect("parse");

    let first = generate_program(&program, check_program(&program).expect("check"))
        .expect("generate");
    let second = generate_program(&program, check_program(&program).expect("check"))
        .expect("generate");
    assert_eq!(first.instructions, second.instructions);
    assert_eq!(first.max_stack, second.max_stack);
    assert_eq!(first.locals, second.locals);
}
