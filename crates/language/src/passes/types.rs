use std::path::Path;

use quarry_tree::{NodeIdx, PassError, PostParsePass, ResolutionContext, SyntaxTree};
use rustc_hash::FxHashSet;

/// Names from `java.lang` that resolve without a classpath.
const JAVA_LANG: &[&str] = &[
	"Boolean",
	"Byte",
	"Character",
	"CharSequence",
	"Class",
	"Double",
	"Enum",
	"Error",
	"Exception",
	"Float",
	"Integer",
	"Iterable",
	"Long",
	"Math",
	"Number",
	"Object",
	"Record",
	"Runnable",
	"RuntimeException",
	"Short",
	"String",
	"StringBuilder",
	"System",
	"Thread",
	"Throwable",
	"Void",
];

const PRIMITIVE_KINDS: &[&str] = &["IntegralType", "FloatingPointType", "BooleanType", "VoidType"];

/// Annotates variable declarators and parameters with their declared type
/// name (`TypeName`) and whether it could be found (`Resolved`).
///
/// Resolution succeeds for primitives, `java.lang` names, types declared in
/// the same compilation unit and types with a `.class` or `.java` file on the
/// classpath. A classpath entry that does not exist fails the pass before
/// anything is annotated.
pub struct TypeResolutionPass;

impl PostParsePass for TypeResolutionPass {
	fn name(&self) -> &'static str {
		"type-resolution"
	}

	fn run(&self, tree: &mut SyntaxTree, context: &ResolutionContext) -> Result<(), PassError> {
		if let Some(missing) = context.classpath().find(|entry| !entry.exists()) {
			return Err(PassError::MissingClasspathEntry(missing.to_path_buf()));
		}

		let root = tree.root();
		let local_types: FxHashSet<String> = tree
			.descendants(root)
			.filter(|&n| is_type_declaration(tree.kind(n)))
			.filter_map(|n| tree.node(n).attribute("Name").map(ToString::to_string))
			.collect();

		let targets: Vec<(NodeIdx, NodeIdx)> = tree
			.descendants(root)
			.filter_map(|n| declared_type(tree, n).map(|ty| (n, ty)))
			.collect();

		for (node, ty) in targets {
			let name = type_name(tree.text(ty));
			let resolved = PRIMITIVE_KINDS.contains(&tree.kind(ty))
				|| name == "var"
				|| JAVA_LANG.contains(&name.as_str())
				|| local_types.contains(simple_name(&name))
				|| on_classpath(context, &name);
			tree.set_attribute(node, "TypeName", name);
			tree.set_attribute(node, "Resolved", resolved);
		}
		Ok(())
	}
}

fn is_type_declaration(kind: &str) -> bool {
	matches!(
		kind,
		"ClassDeclaration" | "InterfaceDeclaration" | "EnumDeclaration" | "RecordDeclaration"
	)
}

/// Type node for a declarator or parameter: the `type` child of the node
/// itself or, for variable declarators, of the enclosing declaration.
fn declared_type(tree: &SyntaxTree, idx: NodeIdx) -> Option<NodeIdx> {
	let holder = match tree.kind(idx) {
		"VariableDeclarator" => tree.parent(idx)?,
		"FormalParameter" | "SpreadParameter" | "CatchFormalParameter" => idx,
		_ => return None,
	};
	tree.children(holder)
		.iter()
		.copied()
		.find(|&c| tree.node(c).field() == Some("type"))
}

/// Erases generics and array dimensions: `List<String>[]` becomes `List`.
fn type_name(text: &str) -> String {
	let base = text.split(['<', '[']).next().unwrap_or(text);
	base.split_whitespace().collect()
}

fn simple_name(name: &str) -> &str {
	name.rsplit('.').next().unwrap_or(name)
}

fn on_classpath(context: &ResolutionContext, name: &str) -> bool {
	let relative = name.replace('.', "/");
	context.classpath().any(|entry| has_type_file(entry, &relative))
}

fn has_type_file(entry: &Path, relative: &str) -> bool {
	["class", "java"]
		.iter()
		.any(|ext| entry.join(format!("{relative}.{ext}")).is_file())
}
