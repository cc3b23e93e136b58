//! Fan-out logger forwarding every call to a set of member channels

use super::{
    error::Result,
    factory::LoggerFactory,
    log_context::LogContext,
    log_level::LogLevel,
    logger::Logger,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Identity of a stack member used for deduplication.
///
/// Members resolved through the factory are keyed by their configuration
/// key, so the same channel reached twice (directly and through a nested
/// stack) is delivered once. Attached loggers are keyed by allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberKey {
    Channel(String),
    Attached(usize),
}

impl MemberKey {
    pub fn attached(logger: &Arc<dyn Logger>) -> Self {
        MemberKey::Attached(Arc::as_ptr(logger) as *const () as usize)
    }
}

/// A resolved member together with its deduplication key
#[derive(Clone)]
pub struct StackMember {
    pub key: MemberKey,
    pub logger: Arc<dyn Logger>,
}

impl fmt::Debug for StackMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackMember")
            .field("key", &self.key)
            .field("channel", &self.logger.channel())
            .finish()
    }
}

/// Forwards each call to its members in configured order.
///
/// Members named by channel are resolved through the factory on first use
/// and cached for the lifetime of the stack. A member that fails to resolve
/// is skipped with a warning, except for circular references, which fail the
/// logging call. Members that are stacks themselves are flattened into their
/// own members so the composed logger never nests.
pub struct StackLogger {
    channel: String,
    member_names: Vec<String>,
    factory: Option<LoggerFactory>,
    /// Channels being resolved when this stack was built, itself included
    ancestry: Vec<String>,
    attached: Vec<Arc<dyn Logger>>,
    resolved: Mutex<Option<Vec<StackMember>>>,
}

impl StackLogger {
    /// Stack of explicitly attached loggers only
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            member_names: Vec::new(),
            factory: None,
            ancestry: Vec::new(),
            attached: Vec::new(),
            resolved: Mutex::new(None),
        }
    }

    /// Stack resolving `member_names` lazily through `factory`.
    ///
    /// Names are deduplicated keeping first occurrence order.
    pub fn with_members(
        channel: impl Into<String>,
        member_names: Vec<String>,
        factory: LoggerFactory,
        ancestry: Vec<String>,
    ) -> Self {
        let mut seen = HashSet::new();
        let member_names = member_names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();

        Self {
            member_names,
            factory: Some(factory),
            ancestry,
            ..Self::new(channel)
        }
    }

    /// Attach a logger directly; stacks are ignored
    pub fn add_logger(&mut self, logger: Arc<dyn Logger>) -> &mut Self {
        if logger.nested_members().is_some() {
            eprintln!(
                "[LOGGER WARNING] Stack '{}' ignores nested stack '{}'",
                self.channel,
                logger.channel()
            );
        } else {
            self.attached.push(logger);
            *self.resolved.get_mut() = None;
        }
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.add_logger(logger);
        self
    }

    pub fn member_names(&self) -> &[String] {
        &self.member_names
    }

    /// Resolved members, resolving them on first call
    pub fn members(&self) -> Result<Vec<Arc<dyn Logger>>> {
        Ok(self
            .keyed_members()?
            .into_iter()
            .map(|member| member.logger)
            .collect())
    }

    fn keyed_members(&self) -> Result<Vec<StackMember>> {
        let mut cache = self.resolved.lock();
        if let Some(members) = cache.as_ref() {
            return Ok(members.clone());
        }

        let members = self.resolve_members()?;
        *cache = Some(members.clone());
        Ok(members)
    }

    fn resolve_members(&self) -> Result<Vec<StackMember>> {
        let mut members: Vec<StackMember> = Vec::new();
        let mut seen: HashSet<MemberKey> = HashSet::new();

        let mut push = |member: StackMember, members: &mut Vec<StackMember>| {
            if seen.insert(member.key.clone()) {
                members.push(member);
            }
        };

        if let Some(factory) = &self.factory {
            for name in &self.member_names {
                let logger = match factory.make_within(name, &self.ancestry) {
                    Ok(logger) => logger,
                    Err(e) if e.is_cycle() => return Err(e),
                    Err(e) => {
                        eprintln!(
                            "[LOGGER WARNING] Stack '{}' skipped member '{}': {}",
                            self.channel, name, e
                        );
                        continue;
                    }
                };

                match logger.nested_members() {
                    None => push(
                        StackMember {
                            key: MemberKey::Channel(name.clone()),
                            logger,
                        },
                        &mut members,
                    ),
                    Some(Ok(nested)) => {
                        for member in nested {
                            push(member, &mut members);
                        }
                    }
                    Some(Err(e)) if e.is_cycle() => return Err(e),
                    Some(Err(e)) => {
                        eprintln!(
                            "[LOGGER WARNING] Stack '{}' skipped member '{}': {}",
                            self.channel, name, e
                        );
                    }
                }
            }
        }

        for logger in &self.attached {
            push(
                StackMember {
                    key: MemberKey::attached(logger),
                    logger: Arc::clone(logger),
                },
                &mut members,
            );
        }

        Ok(members)
    }

    /// Run `call` on every member; all members are tried, the first error is
    /// returned
    fn forward<F>(&self, call: F) -> Result<()>
    where
        F: Fn(&dyn Logger) -> Result<()>,
    {
        let mut first_error = None;
        for member in self.keyed_members()? {
            if let Err(e) = call(member.logger.as_ref()) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl Logger for StackLogger {
    fn channel(&self) -> &str {
        &self.channel
    }

    fn log(&self, level: LogLevel, message: &str, context: LogContext) -> Result<()> {
        self.forward(|member| member.log(level, message, context.clone()))
    }

    fn smart_log(&self, message: &str, context: LogContext) -> Result<()> {
        self.forward(|member| member.smart_log(message, context.clone()))
    }

    fn flush(&self) -> Result<()> {
        self.forward(|member| member.flush())
    }

    fn nested_members(&self) -> Option<Result<Vec<StackMember>>> {
        Some(self.keyed_members())
    }
}

impl fmt::Debug for StackLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackLogger")
            .field("channel", &self.channel)
            .field("member_names", &self.member_names)
            .field("attached", &self.attached.len())
            .finish()
    }
}
