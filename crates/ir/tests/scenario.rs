use std::fs;

use revlang_ir::{builder::test_util, prelude::*, FunctionBuilder, Module};

#[test]
fn branch_function_is_valid_and_dumps_verbatim() {
    let (module, f1) = test_util::branch_module();
    assert!(module.is_valid(f1));

    let expected = "ModuleID: m1

var !0
var !1
var !2

def f1():
 ; Successors: bb.1(tag: true) bb.2(tag: false) \n bb.0:
    var !0 = ADD var !1, var !2
 bb.1:
    LOAD var !0
 bb.2:
    STORE var !1, var !2

";
    assert_eq!(module.dump_string(), expected);
    module.dump().unwrap();
}

#[test]
fn block_without_incoming_edge_is_invalid() {
    let mut module = Module::new("m1");
    let v0 = module.make_gv(0);
    let v1 = module.make_gv(1);
    let v2 = module.make_gv(2);

    let mut builder = FunctionBuilder::new(&mut module, "f1");
    let bb0 = builder.append_entry_block("bb.0");
    builder.switch_to_block(bb0);
    builder.add(v0, &[v1, v2]);
    let bb1 = builder.append_block("bb.1");
    builder.add_succ(bb0, "true", bb1);
    builder.switch_to_block(bb1);
    builder.load(v0);
    let bb2 = builder.append_block("bb.2");
    builder.switch_to_block(bb2);
    builder.store(v1, v2);
    let f1 = builder.finish();

    assert!(!module.is_valid(f1));

    // Linking the block in makes the function valid again.
    module.add_succ(bb1, "false", bb2);
    assert!(module.is_valid(f1));
}

#[test]
fn function_without_entry_is_invalid() {
    let mut module = Module::new("m1.revLang");
    let f = module.make_func("f1");
    let b0 = module.make_block(f, "bb.0", false);
    let b1 = module.make_block(f, "bb.1", false);
    module.add_succ(b0, "true", b1);
    assert!(!module.is_valid(f));

    module.set_entry_block(f, b0);
    assert!(module.is_valid(f));
}

#[test]
fn diamond_dot_file_has_four_edges() {
    let (module, foo) = test_util::diamond_module();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("revLang-cfg.dot");
    module.print_cfg_as_dot(foo, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.first(), Some(&"digraph foo {"));
    assert_eq!(lines.last(), Some(&"}"));

    let mut edges: Vec<_> = lines
        .iter()
        .filter(|line| line.contains("->"))
        .map(|line| line.trim())
        .collect();
    edges.sort_unstable();
    assert_eq!(
        edges,
        vec![
            "H -> J[ label = \"\"];",
            "I -> J[ label = \"\"];",
            "entry -> H[ label = \"true\"];",
            "entry -> I[ label = \"false\"];",
        ]
    );
}

#[test]
fn loops_are_valid() {
    let mut module = Module::new("m");
    let mut builder = FunctionBuilder::new(&mut module, "loop");
    let entry = builder.append_entry_block("entry");
    let header = builder.append_block("header");
    let body = builder.append_block("body");
    let exit = builder.append_block("exit");
    builder.add_succ(entry, "", header);
    builder.add_succ(header, "true", body);
    builder.add_succ(body, "", header);
    builder.add_succ(header, "false", exit);
    let f = builder.finish();

    assert!(module.is_valid(f));

    let island = module.make_block(f, "island", false);
    module.add_succ(island, "", island);
    assert!(!module.is_valid(f));
}

#[test]
fn instruction_dump_forms() {
    let mut module = Module::new("m");
    let gvs: Vec<_> = (0..5).map(|id| module.make_gv(id)).collect();
    let f = module.make_func("f");
    let b = module.make_block(f, "bb.0", true);

    let load = module.append_inst(b, Load::new(&gvs[4..]));
    let store = module.append_inst(b, Store::new(&gvs[..2]));
    let add = module.append_inst(b, Add::new(&gvs));

    assert_eq!(load.dump_string(&module), "LOAD var !4");
    assert_eq!(store.dump_string(&module), "STORE var !0, var !1");
    assert_eq!(
        add.dump_string(&module),
        "var !0 = ADD var !1, var !2, var !3, var !4"
    );
}
