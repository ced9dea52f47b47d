use quarry_tree::{
	AttrValue, Declaration, DeclarationKind, NodeIdx, PassError, PostParsePass, ResolutionContext, ScopeKind, SyntaxTree,
};

/// Opens scopes for type bodies, callables and blocks and records the names
/// declared in each.
pub struct SymbolTablePass;

fn scope_kind(kind: &str) -> Option<ScopeKind> {
	match kind {
		"CompilationUnit" | "ClassBody" | "InterfaceBody" | "EnumBody" | "AnnotationTypeBody" => Some(ScopeKind::Type),
		"MethodDeclaration" | "ConstructorDeclaration" | "LambdaExpression" | "CompactConstructorDeclaration" => {
			Some(ScopeKind::Callable)
		}
		"Block" | "ConstructorBody" | "ForStatement" | "EnhancedForStatement" | "CatchClause" => Some(ScopeKind::Block),
		_ => None,
	}
}

fn declaration_kind(tree: &SyntaxTree, idx: NodeIdx) -> Option<DeclarationKind> {
	match tree.kind(idx) {
		"ClassDeclaration" | "InterfaceDeclaration" | "EnumDeclaration" | "RecordDeclaration" => {
			Some(DeclarationKind::Type)
		}
		"MethodDeclaration" | "ConstructorDeclaration" => Some(DeclarationKind::Method),
		"FormalParameter" | "SpreadParameter" | "CatchFormalParameter" => Some(DeclarationKind::Parameter),
		"EnhancedForStatement" => Some(DeclarationKind::Local),
		"VariableDeclarator" => match tree.parent(idx).map(|p| tree.kind(p)) {
			Some("FieldDeclaration" | "ConstantDeclaration") => Some(DeclarationKind::Field),
			_ => Some(DeclarationKind::Local),
		},
		_ => None,
	}
}

impl PostParsePass for SymbolTablePass {
	fn name(&self) -> &'static str {
		"symbol-table"
	}

	fn run(&self, tree: &mut SyntaxTree, _context: &ResolutionContext) -> Result<(), PassError> {
		tree.scopes_mut().clear();
		let root = tree.root();
		let nodes: Vec<NodeIdx> = std::iter::once(root).chain(tree.descendants(root)).collect();

		for idx in nodes {
			if let Some(kind) = scope_kind(tree.kind(idx)) {
				tree.scopes_mut().open(idx, kind);
			}
			let Some(kind) = declaration_kind(tree, idx) else {
				continue;
			};
			let Some(AttrValue::Str(name)) = tree.node(idx).attribute("Name").cloned() else {
				continue;
			};
			// A callable declares itself in the enclosing type, not in its own
			// scope; a for-each variable belongs to the loop.
			let own = (tree.kind(idx) == "EnhancedForStatement").then_some(idx);
			let Some(scope) = own
				.into_iter()
				.chain(tree.ancestors(idx))
				.find(|&a| tree.scopes().get(a).is_some())
			else {
				continue;
			};
			let declared = tree.scopes_mut().declare(scope, Declaration { name, kind, node: idx });
			if !declared {
				return Err(PassError::Failed {
					pass: "symbol-table",
					reason: format!("no scope open at node {}", scope.get()),
				});
			}
		}
		Ok(())
	}
}
