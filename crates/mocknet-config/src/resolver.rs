//! Expansion of stack and template references into concrete services.
//!
//! Resolution is a work-list traversal of the root document's service
//! list. Items are pushed in reverse so popping yields the declared
//! left-to-right order: a stack reference expands in place, a template
//! item is replaced by its concrete copy, and a basic service is emitted
//! once — later occurrences of an already-emitted name are dropped, which
//! makes a service reachable both directly and through a stack harmless.

use std::collections::HashSet;

use mocknet_common::error::{ConfigError, Result};

use crate::document::{BasicService, ServiceItem, StackRef, TemplateService};
use crate::registry::Registry;

impl Registry {
    /// Returns a lazy, one-shot iterator over the concrete services of
    /// the root document, in emission order. Restarting requires a fresh
    /// call.
    #[must_use]
    pub fn iter_services(&self) -> ServiceIter<'_> {
        let pending = self.root().services.iter().rev().cloned().collect();
        ServiceIter {
            registry: self,
            pending,
            expanded_stacks: HashSet::new(),
            emitted: HashSet::new(),
            done: false,
        }
    }

    /// Resolves the whole graph eagerly into the final service list.
    ///
    /// # Errors
    ///
    /// Returns the first reference error encountered during expansion.
    pub fn resolve(&self) -> Result<Vec<BasicService>> {
        self.iter_services().collect()
    }

    /// Resolves a template item into a concrete service, following
    /// template-of-template chains.
    fn resolve_template(&self, item: &TemplateService) -> Result<BasicService> {
        self.resolve_template_chain(item, &mut HashSet::new())
    }

    fn resolve_template_chain(
        &self,
        item: &TemplateService,
        seen: &mut HashSet<String>,
    ) -> Result<BasicService> {
        let Some(base) = self.services.get(&item.template) else {
            return Err(ConfigError::NotFound {
                kind: "template",
                name: item.template.clone(),
                detail: format!(
                    "required by service '{}' declared in {}",
                    item.name,
                    item.file.display()
                ),
            });
        };

        let concrete = match base {
            ServiceItem::Basic(basic) => basic.clone(),
            ServiceItem::Template(template) => {
                if !seen.insert(template.name.clone()) {
                    return Err(ConfigError::Conflict {
                        kind: "template",
                        name: template.name.clone(),
                        detail: format!(
                            "template chain starting at service '{}' is cyclic",
                            item.name
                        ),
                    });
                }
                self.resolve_template_chain(template, seen)?
            }
            // The services map only holds named items, and stack
            // placeholders are anonymous.
            ServiceItem::Stack(_) => {
                return Err(ConfigError::NotFound {
                    kind: "template",
                    name: item.template.clone(),
                    detail: format!("'{}' does not name a service", item.template),
                });
            }
        };

        let mut resolved = concrete;
        item.apply_overrides(&mut resolved);
        resolved.name = item.name.clone();
        resolved.file = item.file.clone();
        resolved.inherits.insert(0, format!("template:{}", item.template));
        Ok(resolved)
    }
}

/// Pull-based cursor over the concrete services of one resolution pass.
///
/// Yields `Result` items; after the first error the iterator is fused and
/// yields nothing further.
#[derive(Debug)]
pub struct ServiceIter<'a> {
    registry: &'a Registry,
    /// Work list, processed last-in-first-out.
    pending: Vec<ServiceItem>,
    /// Stacks already expanded in this traversal; re-encounters are
    /// skipped silently.
    expanded_stacks: HashSet<String>,
    /// Names already emitted; later occurrences are dropped.
    emitted: HashSet<String>,
    done: bool,
}

impl ServiceIter<'_> {
    fn expand_stack(&mut self, item: &StackRef) -> Result<()> {
        let Some(stack) = self.registry.stacks.get(&item.stack) else {
            return Err(ConfigError::NotFound {
                kind: "stack",
                name: item.stack.clone(),
                detail: format!("referenced in {}", item.file.display()),
            });
        };
        if !self.expanded_stacks.insert(stack.name.clone()) {
            return Ok(());
        }
        tracing::debug!(stack = %stack.name, members = stack.services.len(), "expanding stack");

        let mut members = Vec::with_capacity(stack.services.len());
        for name in &stack.services {
            let Some(service) = self.registry.services.get(name) else {
                return Err(ConfigError::NotFound {
                    kind: "service",
                    name: name.clone(),
                    detail: format!(
                        "required by stack '{}' declared in {}",
                        stack.name,
                        stack.file.display()
                    ),
                });
            };
            let mut member = service.clone();
            member.prepend_inherit(format!("stack:{}", stack.name));
            members.push(member);
        }
        // Reversed so the members are processed next, in declared order.
        self.pending.extend(members.into_iter().rev());
        Ok(())
    }
}

impl Iterator for ServiceIter<'_> {
    type Item = Result<BasicService>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while let Some(item) = self.pending.pop() {
            match item {
                ServiceItem::Stack(stack_ref) => {
                    if let Err(err) = self.expand_stack(&stack_ref) {
                        self.done = true;
                        return Some(Err(err));
                    }
                }
                ServiceItem::Template(template) => {
                    match self.registry.resolve_template(&template) {
                        Ok(service) => self.pending.push(ServiceItem::Basic(service)),
                        Err(err) => {
                            self.done = true;
                            return Some(Err(err));
                        }
                    }
                }
                ServiceItem::Basic(service) => {
                    if self.emitted.insert(service.name.clone()) {
                        return Some(Ok(service));
                    }
                }
            }
        }
        self.done = true;
        None
    }
}
