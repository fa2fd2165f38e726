//! A program run: class discovery, entry-point lookup, and invocation.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::debug;

use kava_parse::parse_program;

use crate::class::{self, ClassDef, TemplateDef};
use crate::errors::{self, Fatal, FatalError, FaultKind};
use crate::exec::{Exec, Signal};
use crate::host::{InputHandler, OutputHandler};
use crate::method::ArgSig;
use crate::object::resolve_method;
use crate::types::TypeRegistry;
use crate::value::ObjRef;

/// Class whose parameterless `main` method starts the program.
pub const ENTRY_CLASS: &str = "main";
pub const ENTRY_METHOD: &str = "main";

/// One interpreter run: the class and template registries, the type graph,
/// and the host I/O handlers. Registries grow monotonically - classes at
/// discovery, specializations on first use.
pub struct Session {
    pub classes: FxHashMap<String, Rc<ClassDef>>,
    pub templates: FxHashMap<String, Rc<TemplateDef>>,
    pub types: TypeRegistry,
    pub output: OutputHandler,
    pub input: InputHandler,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    /// A session wired to stdout and stdin.
    pub fn new() -> Session {
        Session::with_host(OutputHandler::Stdout, InputHandler::Stdin)
    }

    pub fn with_host(output: OutputHandler, input: InputHandler) -> Session {
        Session {
            classes: FxHashMap::default(),
            templates: FxHashMap::default(),
            types: TypeRegistry::new(),
            output,
            input,
        }
    }

    /// Parse and run a whole program: register every class and template,
    /// instantiate the entry class, and invoke its entry method.
    pub fn run(&mut self, source: &str) -> Fatal<()> {
        let forms = parse_program(source).map_err(|err| FatalError {
            kind: FaultKind::Syntax,
            message: err.to_string(),
            line: None,
        })?;

        for form in &forms {
            match form.head_sym() {
                Some("class") => {
                    let def = ClassDef::from_form(form)?;
                    if self.classes.contains_key(&def.name)
                        || self.templates.contains_key(&def.name)
                    {
                        return Err(errors::duplicate_class(&def.name, def.line));
                    }
                    debug!(class = %def.name, "registering class");
                    self.types
                        .register_class(&def.name, def.super_class.as_deref());
                    self.classes.insert(def.name.clone(), Rc::new(def));
                }
                Some("tclass") => {
                    let def = TemplateDef::from_form(form)?;
                    if self.classes.contains_key(&def.name)
                        || self.templates.contains_key(&def.name)
                    {
                        return Err(errors::duplicate_class(&def.name, def.line));
                    }
                    debug!(template = %def.name, "registering template");
                    self.templates.insert(def.name.clone(), Rc::new(def));
                }
                _ => return Err(errors::invalid_program()),
            }
        }

        let entry = self
            .classes
            .get(ENTRY_CLASS)
            .cloned()
            .ok_or_else(|| errors::entry_class_missing(ENTRY_CLASS))?;
        let root = class::instantiate(self, &entry)?;
        self.invoke_entry(&root, entry.line)
    }

    /// Invoke the parameterless entry method on the entry instance. An
    /// exception that unwinds all the way out is a fault.
    #[tracing::instrument(skip_all)]
    fn invoke_entry(&mut self, root: &ObjRef, line: u32) -> Fatal<()> {
        let (owner, method) =
            resolve_method(root, ENTRY_METHOD, &ArgSig::new(), &self.types, line)?;

        owner
            .borrow_mut()
            .push_frame(FxHashMap::default(), root.clone());
        let signal = {
            let mut exec = Exec { session: self };
            exec.run_statement(&owner, &method.body)
        };
        owner.borrow_mut().pop_frame();

        match signal? {
            Signal::Raised(payload) => Err(errors::uncaught_exception(&payload.display())),
            Signal::Normal | Signal::Returning(_) => Ok(()),
        }
    }
}
