#![allow(unused_crate_dependencies)]

use quarry_language::LanguageRegistry;
use quarry_tree::{ParserProvider, ResolutionContext};

const SOURCE: &str = "package demo;

import java.util.List;

public class Inventory {
	private final List<String> items;

	public Inventory(List<String> items) {
		this.items = items;
	}

	int count(String prefix) {
		int n = 0;
		for (String item : items) {
			if (item.startsWith(prefix)) {
				n++;
			}
		}
		return n;
	}
}
";

#[test]
fn registry_parses_and_decorates_a_whole_file() {
	let registry = LanguageRegistry::with_defaults();
	let version = registry.parse_version("java 17").expect("java 17 is registered");
	let parser = registry.parser(version.language).expect("java parser");

	let mut tree = parser.parse(SOURCE, version).expect("valid source");
	for pass in parser.passes() {
		pass.run(&mut tree, &ResolutionContext::default())
			.unwrap_or_else(|err| panic!("{} failed: {err}", pass.name()));
	}

	let kinds: Vec<_> = tree.descendants(tree.root()).map(|n| tree.kind(n)).collect();
	for expected in [
		"PackageDeclaration",
		"ImportDeclaration",
		"ClassDeclaration",
		"FieldDeclaration",
		"ConstructorDeclaration",
		"MethodDeclaration",
		"LocalVariableDeclaration",
		"IfStatement",
	] {
		assert!(kinds.contains(&expected), "missing {expected} in {kinds:?}");
	}
	assert!(!tree.scopes().is_empty());
	assert_eq!(tree.source(), SOURCE);
}

#[test]
fn syntax_errors_carry_a_position() {
	let registry = LanguageRegistry::with_defaults();
	let version = registry.parse_version("java").expect("default version");
	let parser = registry.parser("java").expect("java parser");

	let err = parser.parse("class Broken { int = ; }", version).expect_err("invalid source");
	let (line, _) = err.position().expect("syntax errors are positioned");
	assert_eq!(line, 1);
}
