//! Execution planning.
//!
//! Turns "run action X" into a duplicate-free list of steps in which every
//! step comes after everything it depends on. All references are checked
//! while planning, so a plan that builds can be executed without any
//! definition errors surfacing halfway through.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::action::{ActionCollection, Reference, Step};
use crate::error::{J3nError, Result};
use crate::runner::DependencyGraph;

/// A step scheduled by the planner, with its references resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    /// The step itself.
    pub reference: Reference,

    /// Resolved dependencies and input, in declaration order.
    pub prerequisites: Vec<Reference>,

    /// Resolved input reference, if the step declares one.
    pub input: Option<Reference>,
}

/// Ordered, duplicate-free list of steps for one action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    action: String,
    steps: Vec<PlannedStep>,
    action_dependencies: BTreeMap<String, Vec<String>>,
}

impl ExecutionPlan {
    /// Plan the action `name` and everything it transitively needs.
    pub fn build(actions: &ActionCollection, name: &str) -> Result<Self> {
        let mut planner = Planner::new(actions);
        planner.plan_action(name)?;

        Ok(Self {
            action: name.to_string(),
            steps: planner.steps,
            action_dependencies: planner.action_dependencies,
        })
    }

    /// The requested action.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Planned steps in execution order.
    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    /// References in execution order.
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.steps.iter().map(|s| &s.reference)
    }

    /// Look up a planned step.
    pub fn get(&self, reference: &Reference) -> Option<&PlannedStep> {
        self.steps.iter().find(|s| &s.reference == reference)
    }

    /// Check if a reference is part of the plan.
    pub fn contains(&self, reference: &Reference) -> bool {
        self.get(reference).is_some()
    }

    /// Number of planned steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if nothing is planned.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step-level dependency graph of the plan.
    ///
    /// Nodes are qualified references. Each step depends on its resolved
    /// prerequisites and on every planned step of every action its own
    /// action transitively depends on, including through actions that
    /// have no steps.
    pub fn graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        let mut upstream: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

        for planned in &self.steps {
            let node = planned.reference.to_string();
            graph.add_node(node.clone());

            for prerequisite in &planned.prerequisites {
                graph.add_edge(node.clone(), prerequisite.to_string());
            }

            let action = planned.reference.action.as_str();
            let required = upstream
                .entry(action)
                .or_insert_with(|| self.upstream_actions(action));
            for other in &self.steps {
                if required.contains(other.reference.action.as_str()) {
                    graph.add_edge(node.clone(), other.reference.to_string());
                }
            }
        }

        graph
    }

    /// Every action `action` depends on, directly or transitively.
    pub fn upstream_actions(&self, action: &str) -> BTreeSet<&str> {
        let mut seen = BTreeSet::new();
        let mut pending = vec![action];

        while let Some(current) = pending.pop() {
            let Some(dependencies) = self.action_dependencies.get(current) else {
                continue;
            };
            for dependency in dependencies {
                if seen.insert(dependency.as_str()) {
                    pending.push(dependency.as_str());
                }
            }
        }

        seen.remove(action);
        seen
    }

    /// Layered view of the plan: fronts of mutually independent steps.
    pub fn fronts(&self) -> Result<Vec<Vec<Reference>>> {
        let mut by_name: BTreeMap<String, &Reference> = BTreeMap::new();
        for reference in self.references() {
            by_name.insert(reference.to_string(), reference);
        }

        self.graph()
            .fronts()?
            .into_iter()
            .map(|front| {
                front
                    .into_iter()
                    .map(|node| {
                        by_name
                            .get(&node)
                            .map(|r| (*r).clone())
                            .ok_or_else(|| J3nError::InvalidReference { reference: node })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }
}

struct Planner<'a> {
    actions: &'a ActionCollection,
    steps: Vec<PlannedStep>,
    planned: HashSet<Reference>,
    planned_actions: HashSet<String>,
    action_dependencies: BTreeMap<String, Vec<String>>,
    action_stack: Vec<String>,
    step_stack: Vec<Reference>,
}

impl<'a> Planner<'a> {
    fn new(actions: &'a ActionCollection) -> Self {
        Self {
            actions,
            steps: Vec::new(),
            planned: HashSet::new(),
            planned_actions: HashSet::new(),
            action_dependencies: BTreeMap::new(),
            action_stack: Vec::new(),
            step_stack: Vec::new(),
        }
    }

    fn plan_action(&mut self, name: &str) -> Result<()> {
        if self.planned_actions.contains(name) {
            return Ok(());
        }
        if let Some(start) = self.action_stack.iter().position(|a| a == name) {
            let mut cycle = self.action_stack[start..].to_vec();
            cycle.push(name.to_string());
            return Err(J3nError::CyclicDependency {
                cycle: cycle.join(" -> "),
            });
        }

        let actions = self.actions;
        let action = actions.action(name)?;
        self.action_stack.push(name.to_string());

        // Dependent actions are planned completely before our own steps.
        for dependency in &action.dependencies {
            if !self.actions.has_action(dependency) {
                return Err(J3nError::UndefinedActionDependency {
                    action: name.to_string(),
                    dependency: dependency.clone(),
                });
            }
            self.plan_action(dependency)?;
        }
        self.action_dependencies
            .insert(name.to_string(), action.dependencies.clone());

        for (step_name, step) in &action.steps {
            self.plan_step(Reference::new(name, step_name.as_str()), step)?;
        }

        self.action_stack.pop();
        self.planned_actions.insert(name.to_string());
        Ok(())
    }

    fn plan_step(&mut self, reference: Reference, step: &'a Step) -> Result<()> {
        if self.planned.contains(&reference) {
            return Ok(());
        }
        if let Some(start) = self.step_stack.iter().position(|r| r == &reference) {
            let mut cycle: Vec<String> = self.step_stack[start..]
                .iter()
                .map(Reference::to_string)
                .collect();
            cycle.push(reference.to_string());
            return Err(J3nError::CyclicDependency {
                cycle: cycle.join(" -> "),
            });
        }

        self.step_stack.push(reference.clone());

        let mut prerequisites = Vec::new();
        for text in step.prerequisites() {
            let prerequisite = Reference::resolve(text, &reference.action)?;

            if !self.planned.contains(&prerequisite) {
                let actions = self.actions;
                let target = actions.step(&prerequisite).ok_or_else(|| {
                    J3nError::UndefinedStep {
                        action: reference.action.clone(),
                        step: reference.step.clone(),
                        reference: text.to_string(),
                    }
                })?;
                self.plan_step(prerequisite.clone(), target)?;
            }

            prerequisites.push(prerequisite);
        }

        let input = step
            .input()
            .map(|text| Reference::resolve(text, &reference.action))
            .transpose()?;

        self.step_stack.pop();
        self.planned.insert(reference.clone());
        self.steps.push(PlannedStep {
            reference,
            prerequisites,
            input,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    fn position(plan: &ExecutionPlan, reference: &str) -> usize {
        plan.references()
            .position(|r| r.to_string() == reference)
            .unwrap()
    }

    fn build_action() -> Action {
        Action::new()
            .with_step("compile", Step::new("exec").with_output())
            .with_step(
                "test",
                Step::new("exec").depends_on("compile").with_input("compile"),
            )
    }

    #[test]
    fn unknown_action_fails() {
        let actions = ActionCollection::new();
        assert!(matches!(
            ExecutionPlan::build(&actions, "build"),
            Err(J3nError::ActionNotFound { .. })
        ));
    }

    #[test]
    fn orders_dependencies_first_and_resolves_input() {
        let actions = ActionCollection::new().with_action("build", build_action());

        let plan = ExecutionPlan::build(&actions, "build").unwrap();

        assert_eq!(plan.len(), 2);
        assert!(position(&plan, "build.compile") < position(&plan, "build.test"));

        let test = plan.get(&Reference::new("build", "test")).unwrap();
        assert_eq!(test.input, Some(Reference::new("build", "compile")));
        assert_eq!(test.prerequisites, vec![Reference::new("build", "compile")]);
    }

    #[test]
    fn dependency_declared_after_dependent_is_still_first() {
        // "a_package" sorts before "z_compile" but depends on it.
        let actions = ActionCollection::new().with_action(
            "build",
            Action::new()
                .with_step("a_package", Step::new("exec").depends_on("z_compile"))
                .with_step("z_compile", Step::new("exec")),
        );

        let plan = ExecutionPlan::build(&actions, "build").unwrap();
        assert!(position(&plan, "build.z_compile") < position(&plan, "build.a_package"));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn dependent_action_steps_come_first() {
        let actions = ActionCollection::new()
            .with_action("build", build_action())
            .with_action(
                "deploy",
                Action::new()
                    .depends_on("build")
                    .with_step("upload", Step::new("exec")),
            );

        let plan = ExecutionPlan::build(&actions, "deploy").unwrap();

        let upload = position(&plan, "deploy.upload");
        assert!(position(&plan, "build.compile") < upload);
        assert!(position(&plan, "build.test") < upload);
    }

    #[test]
    fn qualified_dependency_pulls_in_foreign_step() {
        let actions = ActionCollection::new()
            .with_action(
                "assets",
                Action::new()
                    .with_step("bundle", Step::new("exec").with_output())
                    .with_step("unused", Step::new("exec")),
            )
            .with_action(
                "site",
                Action::new().with_step("render", Step::new("print").with_input("assets.bundle")),
            );

        let plan = ExecutionPlan::build(&actions, "site").unwrap();

        assert!(plan.contains(&Reference::new("assets", "bundle")));
        assert!(!plan.contains(&Reference::new("assets", "unused")));
        assert!(position(&plan, "assets.bundle") < position(&plan, "site.render"));
    }

    #[test]
    fn undefined_qualified_input_names_missing_reference() {
        let actions = ActionCollection::new().with_action(
            "build",
            Action::new().with_step(
                "report",
                Step::new("print").with_input("otherAction.otherStep"),
            ),
        );

        let err = ExecutionPlan::build(&actions, "build").unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, J3nError::UndefinedStep { .. }));
        assert!(msg.contains("otherAction.otherStep"));
        assert!(msg.contains("report"));
        assert!(msg.contains("build"));
    }

    #[test]
    fn undefined_bare_dependency_fails() {
        let actions = ActionCollection::new().with_action(
            "build",
            Action::new().with_step("test", Step::new("exec").depends_on("compile")),
        );

        assert!(matches!(
            ExecutionPlan::build(&actions, "build"),
            Err(J3nError::UndefinedStep { reference, .. }) if reference == "compile"
        ));
    }

    #[test]
    fn undefined_action_dependency_fails() {
        let actions = ActionCollection::new()
            .with_action("deploy", Action::new().depends_on("build"));

        assert!(matches!(
            ExecutionPlan::build(&actions, "deploy"),
            Err(J3nError::UndefinedActionDependency { dependency, .. }) if dependency == "build"
        ));
    }

    #[test]
    fn invalid_reference_syntax_fails() {
        let actions = ActionCollection::new().with_action(
            "build",
            Action::new().with_step("test", Step::new("exec").depends_on("a.b.c")),
        );

        assert!(matches!(
            ExecutionPlan::build(&actions, "build"),
            Err(J3nError::InvalidReference { .. })
        ));
    }

    #[test]
    fn step_cycle_is_reported() {
        let actions = ActionCollection::new().with_action(
            "build",
            Action::new()
                .with_step("a", Step::new("exec").depends_on("b"))
                .with_step("b", Step::new("exec").depends_on("a")),
        );

        assert!(matches!(
            ExecutionPlan::build(&actions, "build"),
            Err(J3nError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn action_cycle_is_reported() {
        let actions = ActionCollection::new()
            .with_action("a", Action::new().depends_on("b"))
            .with_action("b", Action::new().depends_on("a"));

        assert!(matches!(
            ExecutionPlan::build(&actions, "a"),
            Err(J3nError::CyclicDependency { cycle }) if cycle == "a -> b -> a"
        ));
    }

    #[test]
    fn shared_dependency_planned_once() {
        let actions = ActionCollection::new()
            .with_action("base", Action::new().with_step("setup", Step::new("exec")))
            .with_action("left", Action::new().depends_on("base"))
            .with_action("right", Action::new().depends_on("base"))
            .with_action(
                "top",
                Action::new()
                    .depends_on("left")
                    .depends_on("right")
                    .with_step("finish", Step::new("exec").depends_on("base.setup")),
            );

        let plan = ExecutionPlan::build(&actions, "top").unwrap();
        let setups = plan
            .references()
            .filter(|r| r == &&Reference::new("base", "setup"))
            .count();
        assert_eq!(setups, 1);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn planning_is_repeatable() {
        let actions = ActionCollection::new()
            .with_action("build", build_action())
            .with_action(
                "deploy",
                Action::new()
                    .depends_on("build")
                    .with_step("upload", Step::new("exec").with_input("build.compile")),
            );

        let first = ExecutionPlan::build(&actions, "deploy").unwrap();
        let second = ExecutionPlan::build(&actions, "deploy").unwrap();
        assert_eq!(
            first.references().collect::<Vec<_>>(),
            second.references().collect::<Vec<_>>()
        );
    }

    #[test]
    fn fronts_respect_action_dependencies() {
        let actions = ActionCollection::new()
            .with_action("build", build_action())
            .with_action(
                "deploy",
                Action::new()
                    .depends_on("build")
                    .with_step("upload", Step::new("exec"))
                    .with_step("notify", Step::new("exec")),
            );

        let plan = ExecutionPlan::build(&actions, "deploy").unwrap();
        let fronts = plan.fronts().unwrap();

        assert_eq!(fronts.len(), 3);
        assert_eq!(fronts[0], vec![Reference::new("build", "compile")]);
        assert_eq!(fronts[1], vec![Reference::new("build", "test")]);
        assert_eq!(
            fronts[2],
            vec![
                Reference::new("deploy", "notify"),
                Reference::new("deploy", "upload")
            ]
        );
    }

    #[test]
    fn fronts_follow_dependencies_through_empty_actions() {
        let actions = ActionCollection::new()
            .with_action("base", Action::new().with_step("setup", Step::new("exec")))
            .with_action("all", Action::new().depends_on("base"))
            .with_action(
                "top",
                Action::new()
                    .depends_on("all")
                    .with_step("finish", Step::new("exec")),
            );

        let plan = ExecutionPlan::build(&actions, "top").unwrap();
        assert_eq!(
            plan.upstream_actions("top"),
            BTreeSet::from(["all", "base"])
        );

        let fronts = plan.fronts().unwrap();
        assert_eq!(
            fronts,
            vec![
                vec![Reference::new("base", "setup")],
                vec![Reference::new("top", "finish")],
            ]
        );
    }

    #[test]
    fn transitive_action_dependencies_order_fronts() {
        let actions = ActionCollection::new()
            .with_action("fetch", Action::new().with_step("download", Step::new("exec")))
            .with_action(
                "build",
                Action::new()
                    .depends_on("fetch")
                    .with_step("compile", Step::new("exec")),
            )
            .with_action(
                "ship",
                Action::new()
                    .depends_on("build")
                    .with_step("upload", Step::new("exec")),
            );

        let plan = ExecutionPlan::build(&actions, "ship").unwrap();
        let graph = plan.graph();
        assert!(graph
            .dependencies_of("ship.upload")
            .contains(&"fetch.download".to_string()));

        let fronts = plan.fronts().unwrap();
        assert_eq!(fronts.len(), 3);
        assert_eq!(fronts[2], vec![Reference::new("ship", "upload")]);
    }
}
