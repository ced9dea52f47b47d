use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use quarry_language::JavaParser;
use quarry_reactive::{Category, ManualClock, MessageChannel, Var};
use quarry_tree::{NodeRef, Parser, SyntaxTree};

use super::*;
use crate::parse_model::Tree;

const SOURCE: &str = "class Foo {
  void m() {
    int x = 1;
  }
}";

fn parse(source: &str) -> Arc<SyntaxTree> {
	Arc::new(
		JavaParser::new()
			.parse(source, JavaParser::default_version())
			.expect("test source parses"),
	)
}

fn find(tree: &Arc<SyntaxTree>, kind: &str) -> NodeRef {
	let idx = tree
		.descendants(tree.root())
		.find(|&i| tree.kind(i) == kind)
		.expect("kind present");
	NodeRef::new(Arc::clone(tree), idx)
}

#[derive(Clone, Copy)]
enum Behavior {
	Record,
	/// Simulates a widget whose change callback publishes.
	Echo,
	Fail,
	Panic,
}

struct Recorder {
	selection: SelectionHandle,
	behavior: Behavior,
	seen: RefCell<Vec<(Option<String>, SelectionOptions)>>,
}

impl Recorder {
	fn new(name: &str, channel: &MessageChannel<NodeSelectionEvent>, behavior: Behavior) -> Rc<Self> {
		Rc::new(Self {
			selection: SelectionHandle::new(name, channel.clone()),
			behavior,
			seen: RefCell::default(),
		})
	}

	fn kinds(&self) -> Vec<Option<String>> {
		self.seen.borrow().iter().map(|(k, _)| k.clone()).collect()
	}
}

impl NodeSelectionSource for Recorder {
	fn selection(&self) -> &SelectionHandle {
		&self.selection
	}

	fn set_focus_node(&self, node: Option<&NodeRef>, options: SelectionOptions) -> anyhow::Result<()> {
		self.seen.borrow_mut().push((node.map(|n| n.kind().to_string()), options));
		match self.behavior {
			Behavior::Record => Ok(()),
			Behavior::Echo => {
				let published = self.selection.user_select(node.cloned(), options);
				anyhow::ensure!(!published, "display update re-published");
				Ok(())
			}
			Behavior::Fail => anyhow::bail!("cannot display"),
			Behavior::Panic => panic!("display exploded"),
		}
	}
}

struct Fixture {
	clock: ManualClock,
	channel: MessageChannel<NodeSelectionEvent>,
	tree: Var<Tree>,
	sync: SelectionSynchronizer,
}

fn fixture() -> Fixture {
	let clock = ManualClock::new();
	let channel = MessageChannel::new(Category::SelectionEvent, Rc::new(clock.clone()));
	let tree = Var::new(Some(parse(SOURCE)));
	let sync = SelectionSynchronizer::new(channel.clone(), tree.clone());
	Fixture {
		clock,
		channel,
		tree,
		sync,
	}
}

impl Fixture {
	fn current(&self, kind: &str) -> NodeRef {
		let tree = self.tree.get().expect("tree");
		find(&tree, kind)
	}
}

#[test]
fn origin_is_not_echoed() {
	let f = fixture();
	let a = Recorder::new("a", &f.channel, Behavior::Record);
	let b = Recorder::new("b", &f.channel, Behavior::Record);
	f.sync.attach(&a);
	f.sync.attach(&b);

	let node = f.current("LocalVariableDeclaration");
	assert!(a.selection.user_select(Some(node.clone()), SelectionOptions::empty()));

	assert!(a.kinds().is_empty());
	assert_eq!(b.kinds(), [Some("LocalVariableDeclaration".to_string())]);
	assert_eq!(a.selection.focused(), Some(node.clone()));
	assert_eq!(b.selection.focused(), Some(node.clone()));
	assert_eq!(f.channel.latest_value().and_then(|e| e.node), Some(node));
}

#[test]
fn display_updates_do_not_republish() {
	let f = fixture();
	let a = Recorder::new("a", &f.channel, Behavior::Record);
	let b = Recorder::new("b", &f.channel, Behavior::Echo);
	let c = Recorder::new("c", &f.channel, Behavior::Echo);
	f.sync.attach(&a);
	f.sync.attach(&b);
	f.sync.attach(&c);

	a.selection.user_select(Some(f.current("MethodDeclaration")), SelectionOptions::empty());
	assert_eq!(f.channel.delivered_count(), 1);
	assert_eq!(b.kinds().len(), 1);
	assert_eq!(c.kinds().len(), 1);
	assert!(!b.selection.is_suspended());
}

#[test]
fn failing_panels_do_not_block_the_others() {
	let f = fixture();
	let origin = Recorder::new("origin", &f.channel, Behavior::Record);
	let failing = Recorder::new("failing", &f.channel, Behavior::Fail);
	let panicking = Recorder::new("panicking", &f.channel, Behavior::Panic);
	let healthy = Recorder::new("healthy", &f.channel, Behavior::Record);
	for panel in [&failing, &panicking, &healthy] {
		f.sync.attach(panel);
	}

	origin.selection.user_select(Some(f.current("Block")), SelectionOptions::empty());
	assert_eq!(healthy.kinds(), [Some("Block".to_string())]);
	assert_eq!(failing.kinds().len(), 1);
	assert_eq!(panicking.kinds().len(), 1);
	assert!(!panicking.selection.is_suspended(), "guard released on unwind");

	origin.selection.user_select(None, SelectionOptions::empty());
	assert_eq!(healthy.kinds(), [Some("Block".to_string()), None]);
}

#[test]
fn repeated_selection_is_delivered_once() {
	let f = fixture();
	let a = Recorder::new("a", &f.channel, Behavior::Record);
	let b = Recorder::new("b", &f.channel, Behavior::Record);
	f.sync.attach(&b);

	let node = f.current("ClassDeclaration");
	a.selection.user_select(Some(node.clone()), SelectionOptions::empty());
	f.clock.advance(Duration::from_millis(40));
	a.selection.user_select(Some(node.clone()), SelectionOptions::empty());
	assert_eq!(b.kinds().len(), 1);

	f.clock.advance(Duration::from_millis(200));
	a.selection.user_select(Some(node), SelectionOptions::empty());
	assert_eq!(b.kinds().len(), 2);
}

#[test]
fn late_panels_show_the_latest_selection() {
	let f = fixture();
	let a = Recorder::new("a", &f.channel, Behavior::Record);
	a.selection.user_select(Some(f.current("Block")), SelectionOptions::NO_SCROLL);

	let late = Recorder::new("late", &f.channel, Behavior::Record);
	f.sync.attach(&late);
	assert_eq!(*late.seen.borrow(), [(Some("Block".to_string()), SelectionOptions::NO_SCROLL)]);
}

#[test]
fn reparse_preserving_shape_recovers_the_selection() {
	let f = fixture();
	let a = Recorder::new("a", &f.channel, Behavior::Record);
	let b = Recorder::new("b", &f.channel, Behavior::Record);
	f.sync.attach(&a);
	f.sync.attach(&b);
	let old = f.current("LocalVariableDeclaration");
	a.selection.user_select(Some(old.clone()), SelectionOptions::empty());

	f.tree.set(Some(parse(&SOURCE.replace("int x", "int  x"))));
	let outcome = f.sync.recover();

	let new = f.current("LocalVariableDeclaration");
	assert_ne!(old, new);
	assert_eq!(outcome, Some(RecoveryOutcome::Relocated(new.clone())));
	assert_eq!(a.selection.focused(), Some(new.clone()));
	assert_eq!(b.selection.focused(), Some(new));
	assert_eq!(a.seen.borrow().last().map(|(_, o)| *o), Some(SelectionOptions::SELECTION_RECOVERY));
	assert_eq!(f.sync.recover(), None, "nothing pending");
}

#[test]
fn structural_edit_clears_the_selection() {
	let f = fixture();
	let a = Recorder::new("a", &f.channel, Behavior::Record);
	let b = Recorder::new("b", &f.channel, Behavior::Record);
	f.sync.attach(&a);
	f.sync.attach(&b);
	a.selection.user_select(Some(f.current("LocalVariableDeclaration")), SelectionOptions::empty());

	f.tree.set(Some(parse("class Foo {\n  void m() {\n  }\n}")));
	assert_eq!(f.sync.recover(), Some(RecoveryOutcome::Cleared));
	assert!(a.selection.is_idle());
	assert!(b.selection.is_idle());
	assert_eq!(f.channel.latest_value(), Some(NodeSelectionEvent::clear()));
}

#[test]
fn losing_the_tree_clears_the_selection() {
	let f = fixture();
	let a = Recorder::new("a", &f.channel, Behavior::Record);
	f.sync.attach(&a);
	let b = Recorder::new("b", &f.channel, Behavior::Record);
	b.selection.user_select(Some(f.current("Block")), SelectionOptions::empty());

	f.tree.set(None);
	assert!(f.sync.is_pending());
	assert_eq!(f.sync.recover(), Some(RecoveryOutcome::Cleared));
	assert!(a.selection.is_idle());
}

#[test]
fn a_selection_from_another_tree_is_recovered_without_a_reparse() {
	let f = fixture();
	let a = Recorder::new("a", &f.channel, Behavior::Record);
	let b = Recorder::new("b", &f.channel, Behavior::Record);
	f.sync.attach(&a);
	f.sync.attach(&b);
	let foreign = find(&parse(SOURCE), "LocalVariableDeclaration");
	a.selection.user_select(Some(foreign.clone()), SelectionOptions::empty());
	assert!(f.sync.is_pending());

	let current = f.current("LocalVariableDeclaration");
	assert_eq!(f.sync.recover(), Some(RecoveryOutcome::Relocated(current.clone())));
	assert_eq!(a.selection.focused(), Some(current.clone()));
	assert_eq!(b.selection.focused(), Some(current));
	assert!(!f.sync.is_pending());
}

#[test]
fn relocation_checks_the_kind() {
	let old = find(&parse(SOURCE), "LocalVariableDeclaration");
	let same_shape = parse("class Foo {\n  void m() {\n    return;\n  }\n}");
	assert_eq!(relocate(&old, &same_shape), None);

	let renamed = parse(&SOURCE.replace("void m()", "void renamed()"));
	let found = relocate(&old, &renamed).expect("same path and kind");
	assert_eq!(found.text(), "int x = 1;");
}

#[test]
fn scrolling_is_suppressed_by_either_flag() {
	assert!(SelectionOptions::empty().allows_scroll());
	assert!(!SelectionOptions::NO_SCROLL.allows_scroll());
	assert!(!SelectionOptions::SELECTION_RECOVERY.allows_scroll());
}
