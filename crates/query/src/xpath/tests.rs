use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quarry_language::JavaParser;
use quarry_tree::{Parser, SyntaxTree};

use super::*;
use crate::engine::QueryErrorKind;

const SOURCE: &str = "class Foo {
	static int i = 0;
	String name;
	void run(int times) {
		int local = times + 1;
	}
}";

fn tree(source: &str) -> Arc<SyntaxTree> {
	Arc::new(
		JavaParser::new()
			.parse(source, JavaParser::default_version())
			.expect("test source parses"),
	)
}

fn query(source: &str, version: XPathVersion, expr: &str, props: &[(&str, &str)]) -> Result<Vec<String>, QueryError> {
	let properties: Properties = props.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
	XPathEngine::new()
		.evaluate(&tree(source), version, expr, &properties)
		.map(|nodes| nodes.iter().map(|n| format!("{}:{}", n.kind(), n.span().begin_line)).collect())
}

fn v2(expr: &str) -> Vec<String> {
	query(SOURCE, XPathVersion::V2, expr, &[]).unwrap()
}

#[test]
fn finds_the_field_declaration() {
	let nodes = XPathEngine::new()
		.evaluate(
			&tree("class Foo { int i = 0; }"),
			XPathVersion::V2,
			"//FieldDeclaration",
			&Properties::new(),
		)
		.unwrap();
	assert_eq!(nodes.len(), 1);
	assert_eq!(nodes[0].text(), "int i = 0;");
}

#[test]
fn absolute_paths_start_above_the_root() {
	assert_eq!(v2("/CompilationUnit"), ["CompilationUnit:1"]);
	assert_eq!(v2("/"), ["CompilationUnit:1"]);
	assert_eq!(v2("/ClassDeclaration"), Vec::<String>::new());
	assert_eq!(v2("//CompilationUnit"), ["CompilationUnit:1"]);
}

#[test]
fn relative_paths_start_at_the_root() {
	assert_eq!(v2("ClassDeclaration/ClassBody/FieldDeclaration"), ["FieldDeclaration:2", "FieldDeclaration:3"]);
}

#[test]
fn attribute_predicates() {
	assert_eq!(v2("//VariableDeclarator[@Name = 'local']"), ["VariableDeclarator:5"]);
	assert_eq!(v2("//FieldDeclaration[@Static = true()]"), ["FieldDeclaration:2"]);
	assert_eq!(v2("//FieldDeclaration[not(@Static = true())]"), ["FieldDeclaration:3"]);
	assert_eq!(v2("//*[@BeginLine > 4]"), v2("//LocalVariableDeclaration | //LocalVariableDeclaration//*"));
}

#[test]
fn selecting_attributes_yields_their_owner() {
	assert_eq!(v2("//ClassDeclaration/@Name"), ["ClassDeclaration:1"]);
}

#[test]
fn positional_predicates_count_per_context() {
	assert_eq!(v2("//FieldDeclaration[1]"), ["FieldDeclaration:2"]);
	assert_eq!(v2("//FieldDeclaration[last()]"), ["FieldDeclaration:3"]);
	assert_eq!(v2("(//VariableDeclarator)[position() > 1]"), ["VariableDeclarator:3", "VariableDeclarator:5"]);
}

#[test]
fn reverse_axes() {
	assert_eq!(v2("//VariableDeclarator[@Name = 'local']/ancestor::*[1]"), ["LocalVariableDeclaration:5"]);
	assert_eq!(v2("//FormalParameter/.."), ["FormalParameters:4"]);
	assert_eq!(
		v2("//VariableDeclarator[@Name = 'local']/ancestor::MethodDeclaration"),
		["MethodDeclaration:4"]
	);
}

#[test]
fn unions_are_in_document_order() {
	assert_eq!(v2("//MethodDeclaration | //FieldDeclaration"), [
		"FieldDeclaration:2",
		"FieldDeclaration:3",
		"MethodDeclaration:4"
	]);
}

#[test]
fn counting_and_strings() {
	assert_eq!(v2("//ClassBody[count(FieldDeclaration) = 2]"), ["ClassBody:1"]);
	assert_eq!(v2("//VariableDeclarator[starts-with(@Name, 'na')]"), ["VariableDeclarator:3"]);
	assert_eq!(v2("//VariableDeclarator[string-length(@Name) = 1]"), ["VariableDeclarator:2"]);
	assert_eq!(v2("//VariableDeclarator[contains(., '+')]"), ["VariableDeclarator:5"]);
}

#[test]
fn v2_functions() {
	assert_eq!(v2("//VariableDeclarator[ends-with(@Name, 'cal')]"), ["VariableDeclarator:5"]);
	assert_eq!(v2("//VariableDeclarator[matches(@Name, '^[a-z]$')]"), ["VariableDeclarator:2"]);
	assert_eq!(v2("//ClassDeclaration[upper-case(@Name) = 'FOO']"), ["ClassDeclaration:1"]);

	let err = query(SOURCE, XPathVersion::V1, "//VariableDeclarator[ends-with(@Name, 'x')]", &[]).unwrap_err();
	assert_eq!(err.kind, QueryErrorKind::UnknownFunction);
	assert_eq!(err.message, "No such function ends-with()");

	let err = query(SOURCE, XPathVersion::V2, "//A[frobnicate(1)]", &[]).unwrap_err();
	assert_eq!(err.message, "Cannot find a 1-argument function named frobnicate()");
}

#[test]
fn variables_come_from_properties() {
	let found = query(SOURCE, XPathVersion::V2, "//VariableDeclarator[@Name = $n]", &[("n", "name")]).unwrap();
	assert_eq!(found, ["VariableDeclarator:3"]);

	let found = query(SOURCE, XPathVersion::V1, "//FieldDeclaration[@BeginLine >= $min]", &[("min", "3")]).unwrap();
	assert_eq!(found, ["FieldDeclaration:3"]);
}

#[test]
fn undeclared_variables_are_reported_per_dialect() {
	let v2 = query(SOURCE, XPathVersion::V2, "//A[@Name = $foo]", &[]).unwrap_err();
	assert_eq!(v2.kind, QueryErrorKind::UndeclaredVariable);
	assert_eq!(v2.message, "Undeclared variable in XPath expression: $foo");

	let compat = query(SOURCE, XPathVersion::V1Compat, "//A[@Name = $foo]", &[]).unwrap_err();
	assert_eq!(compat.message, v2.message);

	let v1 = query(SOURCE, XPathVersion::V1, "//A[@Name = $foo]", &[]).unwrap_err();
	assert_eq!(v1.message, "Variable foo");
}

#[test]
fn strict_comparisons_in_v2_only() {
	let err = query(SOURCE, XPathVersion::V2, "//VariableDeclarator[@Name = 1]", &[]).unwrap_err();
	assert_eq!(err.kind, QueryErrorKind::Type);
	assert!(err.message.starts_with("Cannot compare xs:string"), "{}", err.message);

	let coerced = query(SOURCE, XPathVersion::V1Compat, "//VariableDeclarator[@Name = 1]", &[]).unwrap();
	assert!(coerced.is_empty());
}

#[test]
fn empty_node_set_against_boolean_in_v1() {
	let found = query(SOURCE, XPathVersion::V1, "//ClassDeclaration[Missing = false()]", &[]).unwrap();
	assert_eq!(found, ["ClassDeclaration:1"]);
	let found = query(SOURCE, XPathVersion::V2, "//ClassDeclaration[Missing = false()]", &[]).unwrap();
	assert!(found.is_empty());
}

#[test]
fn errors() {
	let err = query(SOURCE, XPathVersion::V2, "count(//FieldDeclaration)", &[]).unwrap_err();
	assert_eq!(err.kind, QueryErrorKind::Type);

	let err = query(SOURCE, XPathVersion::V2, "//FieldDeclaration[", &[]).unwrap_err();
	assert_eq!(err.kind, QueryErrorKind::Syntax);

	let err = query(SOURCE, XPathVersion::V2, "//VariableDeclarator[matches(@Name, '(')]", &[]).unwrap_err();
	assert_eq!(err.kind, QueryErrorKind::Regex);
}

#[test]
fn recompiles_only_on_change() {
	let engine = XPathEngine::new();
	let tree = tree(SOURCE);
	let props = Properties::new();
	let first = engine.evaluate(&tree, XPathVersion::V2, "//FieldDeclaration", &props).unwrap();
	let second = engine.evaluate(&tree, XPathVersion::V2, "//FieldDeclaration", &props).unwrap();
	assert_eq!(first, second);
	assert!(engine.validate("//A[").is_err());
	assert!(engine.validate("//A[@B]").is_ok());
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(32))]

	/// `count()` agrees with the number of nodes a path selects.
	#[test]
	fn count_matches_selection(fields in 0usize..12) {
		let body: String = (0..fields).map(|i| format!("int f{i};\n")).collect();
		let source = format!("class Gen {{\n{body}}}");
		let selected = query(&source, XPathVersion::V2, "//FieldDeclaration", &[]).unwrap();
		let counted = query(&source, XPathVersion::V2, &format!("/CompilationUnit[count(//FieldDeclaration) = {fields}]"), &[]).unwrap();
		prop_assert_eq!(selected.len(), fields);
		prop_assert_eq!(counted.len(), 1);
	}
}
