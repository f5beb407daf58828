//! Global table, local stack, call-frame stack and the lookup order that
//! binds them: `assign_var`/`find_var`/`is_var` all search the active
//! frame's locals before falling back to globals (§4.3).

use super::{Interpreter, FUNC_CALLS, NUM_GLOBAL_VARS, NUM_LOCAL_VARS};
use crate::error::{Diagnostic, InterpreterError};
use crate::token::{Function, VarKind, Variable};

impl Interpreter {
    /// Lower bound (inclusive) of the locals visible to the active call.
    fn frame_floor(&self) -> usize {
        if self.functos == 0 {
            0
        } else {
            self.call_stack[self.functos - 1]
        }
    }

    pub(super) fn is_var(&self, name: &str) -> bool {
        let floor = self.frame_floor();
        self.locals[floor..self.lvartos]
            .iter()
            .rev()
            .any(|v| v.name == name)
            || self.globals.iter().any(|v| v.name == name)
    }

    pub(super) fn find_var(&self, name: &str) -> Result<i64, Diagnostic> {
        let floor = self.frame_floor();
        if let Some(v) = self.locals[floor..self.lvartos].iter().rev().find(|v| v.name == name) {
            return Ok(v.value);
        }
        if let Some(v) = self.globals.iter().find(|v| v.name == name) {
            return Ok(v.value);
        }
        Err(self.err(InterpreterError::NotVar))
    }

    pub(super) fn assign_var(&mut self, name: &str, value: i64) -> Result<(), Diagnostic> {
        let floor = self.frame_floor();
        for v in self.locals[floor..self.lvartos].iter_mut().rev() {
            if v.name == name {
                v.value = value;
                return Ok(());
            }
        }
        for v in self.globals.iter_mut() {
            if v.name == name {
                v.value = value;
                return Ok(());
            }
        }
        Err(self.err(InterpreterError::NotVar))
    }

    pub(super) fn push_global(&mut self, name: String, kind: VarKind) -> Result<(), Diagnostic> {
        #[cfg(feature = "runtime_checks")]
        if self.globals.len() >= NUM_GLOBAL_VARS {
            return Err(self.err(InterpreterError::TooManyGlobals));
        }
        self.globals.push(Variable {
            name,
            kind,
            value: 0,
        });
        Ok(())
    }

    pub(super) fn push_local(&mut self, var: Variable) -> Result<(), Diagnostic> {
        #[cfg(feature = "runtime_checks")]
        if self.lvartos >= NUM_LOCAL_VARS {
            return Err(self.err(InterpreterError::TooManyLocals));
        }
        if self.lvartos == self.locals.len() {
            self.locals.push(var);
        } else {
            self.locals[self.lvartos] = var;
        }
        self.lvartos += 1;
        Ok(())
    }

    pub(super) fn push_function(&mut self, f: Function) -> Result<(), Diagnostic> {
        #[cfg(feature = "runtime_checks")]
        if self.functions.len() >= super::NUM_FUNC {
            return Err(self.err(InterpreterError::TooManyFunctions));
        }
        self.functions.push(f);
        Ok(())
    }

    pub(super) fn find_function(&self, name: &str) -> Option<Function> {
        self.functions.iter().find(|f| f.name == name).cloned()
    }

    /// Pushes the pre-call `lvartos` as the new frame floor. This is the
    /// value `func_pop` will restore `lvartos` to on return.
    pub(super) fn push_call_frame(&mut self, floor: usize) -> Result<(), Diagnostic> {
        #[cfg(feature = "runtime_checks")]
        if self.functos >= FUNC_CALLS {
            return Err(self.err(InterpreterError::NestFunc));
        }
        if self.functos == self.call_stack.len() {
            self.call_stack.push(floor);
        } else {
            self.call_stack[self.functos] = floor;
        }
        self.functos += 1;
        Ok(())
    }

    /// Pops the call frame, returning the `lvartos` value to restore.
    pub(super) fn pop_call_frame(&mut self) -> Result<usize, Diagnostic> {
        if self.functos == 0 {
            return Err(self.err(InterpreterError::RetNoCall));
        }
        self.functos -= 1;
        Ok(self.call_stack[self.functos])
    }
}
