//! Origin-tagged publish/subscribe.
//!
//! A [`MessageChannel`] decouples components that produce an event type from
//! the ones that consume it. Each message carries the [`ComponentId`] of its
//! origin so that subscribers can opt out of their own echoes.
//!
//! # Delivery
//!
//! * Pushes are delivered synchronously and run to completion. A push made
//!   by a handler is queued behind the message being delivered, so every
//!   subscriber sees messages in push order.
//! * A message equal to any message delivered within the dedup window (same
//!   payload, same origin) is dropped for everyone, so `select(a), clear,
//!   select(a)` chatter collapses to its first two messages.
//! * A handler that fails, by returning `Err` or by panicking, is logged and
//!   skipped; the remaining subscribers still receive the message.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, trace, warn};

use crate::audit::{AuditEntry, AuditSink, Category};
use crate::time::Clock;
use crate::var::{Subscription, Var};

/// Default duplicate-suppression window.
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_millis(100);

/// Identity of a component that publishes or consumes messages.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(Arc<str>);

impl ComponentId {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

impl fmt::Display for ComponentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ComponentId {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

/// A payload tagged with its origin and logging category.
///
/// Equality ignores the category.
#[derive(Debug, Clone)]
pub struct Message<T> {
	pub payload: T,
	pub origin: ComponentId,
	pub category: Category,
}

impl<T: PartialEq> PartialEq for Message<T> {
	fn eq(&self, other: &Self) -> bool {
		self.payload == other.payload && self.origin == other.origin
	}
}

type Handler<T> = Rc<dyn Fn(&T) -> anyhow::Result<()>>;

struct SubscriberEntry<T> {
	id: u64,
	component: ComponentId,
	always_handle_own: bool,
	handler: Handler<T>,
}

struct Audit {
	sink: Arc<dyn AuditSink>,
	developer_mode: Var<bool>,
}

struct Inner<T> {
	category: Category,
	clock: Rc<dyn Clock>,
	dedup_window: Cell<Duration>,
	subscribers: RefCell<Vec<SubscriberEntry<T>>>,
	next_id: Cell<u64>,
	latest: RefCell<Option<T>>,
	/// Delivered messages younger than the dedup window, oldest first.
	recent: RefCell<VecDeque<(Message<T>, Instant)>>,
	queue: RefCell<VecDeque<Message<T>>>,
	delivering: Cell<bool>,
	audit: RefCell<Option<Audit>>,
	delivered: Cell<u64>,
}

/// Typed, origin-aware event bus.
///
/// Clones are handles to the same channel.
pub struct MessageChannel<T> {
	inner: Rc<Inner<T>>,
}

impl<T> Clone for MessageChannel<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> MessageChannel<T> {
	pub fn new(category: Category, clock: Rc<dyn Clock>) -> Self {
		Self {
			inner: Rc::new(Inner {
				category,
				clock,
				dedup_window: Cell::new(DEFAULT_DEDUP_WINDOW),
				subscribers: RefCell::new(Vec::new()),
				next_id: Cell::new(0),
				latest: RefCell::new(None),
				recent: RefCell::new(VecDeque::new()),
				queue: RefCell::new(VecDeque::new()),
				delivering: Cell::new(false),
				audit: RefCell::new(None),
				delivered: Cell::new(0),
			}),
		}
	}

	/// Records every accepted message in `sink` while `developer_mode` is on.
	pub fn with_audit(self, sink: Arc<dyn AuditSink>, developer_mode: Var<bool>) -> Self {
		*self.inner.audit.borrow_mut() = Some(Audit { sink, developer_mode });
		self
	}

	pub fn set_dedup_window(&self, window: Duration) {
		self.inner.dedup_window.set(window);
	}

	pub fn category(&self) -> Category {
		self.inner.category
	}

	/// Publishes `payload` on behalf of `origin`.
	pub fn push(&self, origin: ComponentId, payload: T) {
		let now = self.inner.clock.now();
		let message = Message {
			payload,
			origin,
			category: self.inner.category,
		};

		if self.is_duplicate(&message, now) {
			trace!(origin = %message.origin, category = %message.category, "channel.duplicate_dropped");
			return;
		}
		self.inner.recent.borrow_mut().push_back((message.clone(), now));
		*self.inner.latest.borrow_mut() = Some(message.payload.clone());
		self.audit(&message);

		self.inner.queue.borrow_mut().push_back(message);
		if self.inner.delivering.replace(true) {
			return;
		}
		let _round = DeliveryRound(&self.inner.delivering);

		loop {
			let next = self.inner.queue.borrow_mut().pop_front();
			let Some(message) = next else { break };
			self.deliver(&message);
		}
	}

	/// Subscribes `component` to the channel.
	///
	/// Unless `always_handle_own` is set, messages whose origin is `component`
	/// are not delivered to `handler`.
	pub fn subscribe(
		&self,
		component: ComponentId,
		always_handle_own: bool,
		handler: impl Fn(&T) -> anyhow::Result<()> + 'static,
	) -> Subscription {
		let id = self.inner.next_id.get();
		self.inner.next_id.set(id + 1);
		self.inner.subscribers.borrow_mut().push(SubscriberEntry {
			id,
			component,
			always_handle_own,
			handler: Rc::new(handler),
		});

		let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(inner) = weak.upgrade() {
				inner.subscribers.borrow_mut().retain(|s| s.id != id);
			}
		})
	}

	/// Most recent accepted payload, available to late subscribers.
	pub fn latest_value(&self) -> Option<T> {
		self.inner.latest.borrow().clone()
	}

	/// Number of messages delivered since creation (duplicates excluded).
	pub fn delivered_count(&self) -> u64 {
		self.inner.delivered.get()
	}

	pub fn subscriber_count(&self) -> usize {
		self.inner.subscribers.borrow().len()
	}

	fn is_duplicate(&self, message: &Message<T>, now: Instant) -> bool {
		let window = self.inner.dedup_window.get();
		let mut recent = self.inner.recent.borrow_mut();
		while recent
			.front()
			.is_some_and(|(_, at)| now.saturating_duration_since(*at) >= window)
		{
			recent.pop_front();
		}
		recent.iter().any(|(delivered, _)| delivered == message)
	}

	fn audit(&self, message: &Message<T>) {
		let audit = self.inner.audit.borrow();
		let Some(audit) = audit.as_ref() else { return };
		if !audit.developer_mode.get() {
			return;
		}
		audit.sink.record(
			AuditEntry::new(message.category, format!("{} pushed on {}", message.origin, message.category))
				.with_detail(format!("{:?}", message.payload)),
		);
	}

	fn deliver(&self, message: &Message<T>) {
		self.inner.delivered.set(self.inner.delivered.get() + 1);
		let targets: Vec<(ComponentId, Handler<T>)> = self
			.inner
			.subscribers
			.borrow()
			.iter()
			.filter(|s| s.always_handle_own || s.component != message.origin)
			.map(|s| (s.component.clone(), Rc::clone(&s.handler)))
			.collect();

		for (component, handler) in targets {
			match catch_unwind(AssertUnwindSafe(|| handler(&message.payload))) {
				Ok(Ok(())) => {}
				Ok(Err(err)) => {
					warn!(component = %component, origin = %message.origin, error = %err, "channel.handler_failed");
				}
				Err(panic) => {
					let reason = panic_message(&*panic);
					error!(component = %component, origin = %message.origin, reason, "channel.handler_panicked");
				}
			}
		}
	}
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
	if let Some(s) = panic.downcast_ref::<&'static str>() {
		s
	} else if let Some(s) = panic.downcast_ref::<String>() {
		s.as_str()
	} else {
		"non-string panic payload"
	}
}

/// Clears the delivering flag even if delivery unwinds.
struct DeliveryRound<'a>(&'a Cell<bool>);

impl Drop for DeliveryRound<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}
