//! The TAC interpreter, per spec.md §4.6.
//!
//! Grounded on `faxc-lir::stack_frame::StackFrame`'s "a frame owns its own
//! storage, popped on return" shape, combined with `faxc-drv::Session`'s
//! run-to-completion-or-fail pattern — reworked into the PC/label-prepass/
//! call-stack execution model spec.md §4.6 and §9 describe, since nothing in
//! the teacher's native-compilation pipeline models a dynamically-typed
//! runtime value or a direct-threaded interpreter loop.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tacc_util::{RuntimeError, Symbol};

use tacc_ir::{Label, Literal, Opcode, Operand, Tac, TacInstruction};

/// A hashable dict key. Lists, dicts, and `None` cannot be used as keys
/// (spec.md §4.6: "arbitrary hashable keys").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DictKey {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl TryFrom<&Value> for DictKey {
    type Error = RuntimeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(v) => Ok(DictKey::Int(*v)),
            Value::Bool(v) => Ok(DictKey::Bool(*v)),
            Value::Str(v) => Ok(DictKey::Str(v.clone())),
            _ => Err(RuntimeError::new(format!(
                "tipo no hashable usado como clave: {value}"
            ))),
        }
    }
}

impl fmt::Display for DictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictKey::Int(v) => write!(f, "{v}"),
            DictKey::Bool(true) => write!(f, "True"),
            DictKey::Bool(false) => write!(f, "False"),
            DictKey::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// The interpreter's dynamic value domain (spec.md §4.6). Lists and dicts
/// are reference-semantic: cloning an `Environment` shallow-copies bindings
/// but shares the underlying `Rc<RefCell<_>>`, so a mutation visible through
/// `LIST_APPEND` inside a callee stays visible through the caller's binding
/// of the same value (spec.md §9).
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    List(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<IndexMap<DictKey, Value>>>),
    None,
}

impl Value {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::None => "None",
        }
    }

    /// `str()`-style top-level rendering, used directly by PRINT. Nested
    /// elements of a list/dict use `repr_item` instead so strings come out
    /// quoted, matching the reference language's `print([...])` output.
    fn repr_item(&self) -> String {
        match self {
            Value::Str(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                let inner = items
                    .borrow()
                    .iter()
                    .map(Value::repr_item)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{inner}]")
            }
            Value::Dict(entries) => {
                let inner = entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", v.repr_item()))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{inner}}}")
            }
            Value::None => write!(f, "None"),
        }
    }
}

/// The current variable/temporary bindings. Cloned wholesale on `CALL` and
/// restored wholesale on `RETURN` (spec.md §4.6) — cheap, since containers
/// are `Rc`-shared rather than deep-copied.
#[derive(Debug, Clone, Default)]
struct Environment {
    vars: HashMap<Symbol, Value>,
    temps: HashMap<u32, Value>,
}

impl Environment {
    fn read(&self, op: &Operand) -> Result<Value, RuntimeError> {
        match op {
            Operand::Literal(lit) => Ok(literal_value(lit)),
            Operand::Name(name) => self
                .vars
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::new(format!("variable '{name}' no definida"))),
            Operand::Temp(n) => self
                .temps
                .get(n)
                .cloned()
                .ok_or_else(|| RuntimeError::new(format!("temporal t{n} sin valor"))),
            Operand::Label(l) => Err(RuntimeError::new(format!("no se puede leer la etiqueta {l}"))),
            Operand::ArgList(_) => Err(RuntimeError::new("lista de argumentos usada como valor")),
        }
    }

    fn write(&mut self, op: &Operand, value: Value) -> Result<(), RuntimeError> {
        match op {
            Operand::Name(name) => {
                self.vars.insert(*name, value);
                Ok(())
            }
            Operand::Temp(n) => {
                self.temps.insert(*n, value);
                Ok(())
            }
            other => Err(RuntimeError::new(format!("destino de escritura inválido: {other}"))),
        }
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(v) => Value::Int(*v),
        Literal::Float(v) => Value::Float(*v),
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
    }
}

/// One active function call (spec.md §9's glossary entry for "stack frame").
struct CallFrame {
    return_pc: usize,
    saved_env: Environment,
    result_destination: Option<Operand>,
}

/// Fixed positional parameter names the reference implementation binds
/// `CALL` arguments to, regardless of a function's declared parameter list
/// (spec.md §4.6, §9 Open Question 1). `tacc-ir::GeneratedProgram::functions`
/// records the real parameter list but is deliberately not consulted here —
/// this is a documented fidelity choice, not an oversight.
const FIXED_PARAM_NAMES: &[&str] = &["n", "x", "y", "z", "a", "b", "c"];

/// Locate where execution begins: just past the terminating arg-less
/// `RETURN` of the first `LABEL func_*` (spec.md §4.6, §9 Open Question 2).
/// Programs with no functions start at instruction 0. A function body
/// lacking that trailer is a generator invariant violation, not re-validated
/// here.
fn find_start_pc(tac: &Tac) -> usize {
    for (idx, instr) in tac.instructions.iter().enumerate() {
        if instr.op == Opcode::Label {
            if let Some(Operand::Label(Label::Function(_))) = &instr.arg1 {
                for (j, trailer) in tac.instructions.iter().enumerate().skip(idx + 1) {
                    if trailer.op == Opcode::Return && trailer.arg1.is_none() {
                        return j + 1;
                    }
                }
                return idx + 1;
            }
        }
    }
    0
}

enum Flow {
    Next,
    Jump(usize),
    Halt,
}

pub struct Interpreter<'a> {
    tac: &'a Tac,
    labels: HashMap<Label, usize>,
    env: Environment,
    call_stack: Vec<CallFrame>,
    output: Vec<String>,
    pc: usize,
}

/// Run `tac` to completion and return its PRINT output, newline-joined
/// (spec.md §4.6).
pub fn interpret(tac: &Tac) -> Result<String, RuntimeError> {
    let mut interp = Interpreter::new(tac);
    interp.run()?;
    Ok(interp.output.join("\n"))
}

impl<'a> Interpreter<'a> {
    pub fn new(tac: &'a Tac) -> Self {
        Self {
            tac,
            labels: tac.label_index(),
            env: Environment::default(),
            call_stack: Vec::new(),
            output: Vec::new(),
            pc: 0,
        }
    }

    fn run(&mut self) -> Result<(), RuntimeError> {
        self.pc = find_start_pc(self.tac);
        loop {
            if self.pc >= self.tac.instructions.len() {
                return Ok(());
            }
            let instr = &self.tac.instructions[self.pc];
            match self.step(instr)? {
                Flow::Next => self.pc += 1,
                Flow::Jump(target) => self.pc = target,
                Flow::Halt => return Ok(()),
            }
        }
    }

    fn jump_to(&self, label: &Label) -> Result<usize, RuntimeError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| RuntimeError::new(format!("etiqueta sin resolver: {label}")))
    }

    fn step(&mut self, instr: &TacInstruction) -> Result<Flow, RuntimeError> {
        match instr.op {
            Opcode::Assign => {
                let value = self.env.read(arg1(instr)?)?;
                self.env.write(result(instr)?, value)?;
                Ok(Flow::Next)
            }
            Opcode::Add => self.binary_arith(instr, "ADD"),
            Opcode::Sub => self.binary_arith(instr, "SUB"),
            Opcode::Mul => self.binary_arith(instr, "MUL"),
            Opcode::Div => self.binary_arith(instr, "DIV"),
            Opcode::Mod => self.binary_arith(instr, "MOD"),
            Opcode::Neg => {
                let value = self.env.read(arg1(instr)?)?;
                let negated = match value {
                    Value::Int(v) => Value::Int(-v),
                    Value::Float(v) => Value::Float(-v),
                    Value::Bool(v) => Value::Int(if v { -1 } else { 0 }),
                    other => {
                        return Err(RuntimeError::new(format!(
                            "NEG no soporta el tipo {}",
                            other.type_name()
                        )))
                    }
                };
                self.env.write(result(instr)?, negated)?;
                Ok(Flow::Next)
            }
            Opcode::Eq | Opcode::Neq | Opcode::Lt | Opcode::Gt | Opcode::Lte | Opcode::Gte => {
                self.comparison(instr)
            }
            Opcode::Print => {
                let value = self.env.read(arg1(instr)?)?;
                self.output.push(value.to_string());
                Ok(Flow::Next)
            }
            Opcode::Label => Ok(Flow::Next),
            Opcode::Goto => {
                let Some(Operand::Label(target)) = &instr.arg1 else {
                    return Err(RuntimeError::new("GOTO sin etiqueta destino"));
                };
                Ok(Flow::Jump(self.jump_to(target)?))
            }
            Opcode::IfFalse => {
                let cond = self.env.read(arg1(instr)?)?;
                let Some(Operand::Label(target)) = &instr.arg2 else {
                    return Err(RuntimeError::new("IF_FALSE sin etiqueta destino"));
                };
                if truthy(&cond) {
                    Ok(Flow::Next)
                } else {
                    Ok(Flow::Jump(self.jump_to(target)?))
                }
            }
            Opcode::ListCreate => {
                self.env
                    .write(result(instr)?, Value::List(Rc::new(RefCell::new(Vec::new()))))?;
                Ok(Flow::Next)
            }
            Opcode::ListAppend => {
                let container = self.env.read(arg1(instr)?)?;
                let value = self.env.read(arg2(instr)?)?;
                match container {
                    Value::List(items) => {
                        items.borrow_mut().push(value);
                        Ok(Flow::Next)
                    }
                    other => Err(RuntimeError::new(format!(
                        "LIST_APPEND sobre un valor no-lista ({})",
                        other.type_name()
                    ))),
                }
            }
            Opcode::ListGet => {
                let container = self.env.read(arg1(instr)?)?;
                let key = self.env.read(arg2(instr)?)?;
                let value = get_index(&container, &key)?;
                self.env.write(result(instr)?, value)?;
                Ok(Flow::Next)
            }
            // `LIST_SET`'s value lives in `result` (spec.md §4.4/§9's
            // documented irregular convention), and this opcode is also
            // emitted for `dict[key] = value` since `IndexAssignment` does
            // not know the target's runtime type — so both containers are
            // handled here, matching `set_index`'s dual dispatch.
            Opcode::ListSet => {
                let container = self.env.read(arg1(instr)?)?;
                let key = self.env.read(arg2(instr)?)?;
                let value = self.env.read(instr.result.as_ref().ok_or_else(|| {
                    RuntimeError::new("LIST_SET sin valor en el campo result")
                })?)?;
                set_index(&container, &key, value)?;
                Ok(Flow::Next)
            }
            Opcode::DictCreate => {
                self.env.write(
                    result(instr)?,
                    Value::Dict(Rc::new(RefCell::new(IndexMap::new()))),
                )?;
                Ok(Flow::Next)
            }
            Opcode::DictSet => {
                let container = self.env.read(arg1(instr)?)?;
                let key = self.env.read(arg2(instr)?)?;
                let value = self.env.read(instr.result.as_ref().ok_or_else(|| {
                    RuntimeError::new("DICT_SET sin valor en el campo result")
                })?)?;
                set_index(&container, &key, value)?;
                Ok(Flow::Next)
            }
            Opcode::Call => self.call(instr),
            Opcode::Return => self.do_return(instr),
            Opcode::Del => self.del(instr),
            Opcode::Break | Opcode::Continue => Ok(Flow::Next),
        }
    }

    fn binary_arith(&mut self, instr: &TacInstruction, name: &str) -> Result<Flow, RuntimeError> {
        let left = self.env.read(arg1(instr)?)?;
        let right = self.env.read(arg2(instr)?)?;
        let value = arith(instr.op, &left, &right, name)?;
        self.env.write(result(instr)?, value)?;
        Ok(Flow::Next)
    }

    fn comparison(&mut self, instr: &TacInstruction) -> Result<Flow, RuntimeError> {
        let left = self.env.read(arg1(instr)?)?;
        let right = self.env.read(arg2(instr)?)?;
        let value = Value::Bool(compare(instr.op, &left, &right)?);
        self.env.write(result(instr)?, value)?;
        Ok(Flow::Next)
    }

    fn call(&mut self, instr: &TacInstruction) -> Result<Flow, RuntimeError> {
        let Some(Operand::Name(callee)) = &instr.arg1 else {
            return Err(RuntimeError::new("CALL sin nombre de función"));
        };
        let args: Vec<Value> = match &instr.arg2 {
            Some(Operand::ArgList(ops)) => ops
                .iter()
                .map(|op| self.env.read(op))
                .collect::<Result<_, _>>()?,
            Some(op) => vec![self.env.read(op)?],
            None => Vec::new(),
        };

        if let Some(value) = self.call_builtin(callee.as_str(), &args)? {
            self.env.write(result(instr)?, value)?;
            return Ok(Flow::Next);
        }

        let target = self.jump_to(&Label::Function(*callee))?;
        let mut callee_env = Environment::default();
        for (name, value) in FIXED_PARAM_NAMES.iter().zip(args.into_iter()) {
            callee_env.vars.insert(Symbol::intern(name), value);
        }

        self.call_stack.push(CallFrame {
            return_pc: self.pc + 1,
            saved_env: std::mem::replace(&mut self.env, callee_env),
            result_destination: instr.result.clone(),
        });

        Ok(Flow::Jump(target))
    }

    fn call_builtin(&self, name: &str, args: &[Value]) -> Result<Option<Value>, RuntimeError> {
        match name {
            "len" => {
                let value = args
                    .first()
                    .ok_or_else(|| RuntimeError::new("len() requiere un argumento"))?;
                let length = match value {
                    Value::List(items) => items.borrow().len(),
                    Value::Dict(entries) => entries.borrow().len(),
                    Value::Str(s) => s.chars().count(),
                    other => {
                        return Err(RuntimeError::new(format!(
                            "objeto de tipo '{}' no tiene len()",
                            other.type_name()
                        )))
                    }
                };
                Ok(Some(Value::Int(length as i64)))
            }
            "input" => {
                use std::io::Write;

                if let Some(Value::Str(prompt)) = args.first() {
                    if !prompt.is_empty() {
                        print!("{prompt}");
                        std::io::stdout()
                            .flush()
                            .map_err(|e| RuntimeError::new(format!("error escribiendo stdout: {e}")))?;
                    }
                }

                let mut line = String::new();
                std::io::stdin()
                    .read_line(&mut line)
                    .map_err(|e| RuntimeError::new(format!("error leyendo stdin: {e}")))?;
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Ok(Some(Value::Str(line)))
            }
            "int" => {
                let value = args
                    .first()
                    .ok_or_else(|| RuntimeError::new("int() requiere un argumento"))?;
                let converted = match value {
                    Value::Int(v) => *v,
                    Value::Float(v) => *v as i64,
                    Value::Bool(v) => *v as i64,
                    Value::Str(s) => s
                        .trim()
                        .parse()
                        .map_err(|_| RuntimeError::new(format!("no se puede convertir '{s}' a int")))?,
                    other => {
                        return Err(RuntimeError::new(format!(
                            "int() no soporta el tipo {}",
                            other.type_name()
                        )))
                    }
                };
                Ok(Some(Value::Int(converted)))
            }
            "float" => {
                let value = args
                    .first()
                    .ok_or_else(|| RuntimeError::new("float() requiere un argumento"))?;
                let converted = match value {
                    Value::Int(v) => *v as f64,
                    Value::Float(v) => *v,
                    Value::Bool(v) => if *v { 1.0 } else { 0.0 },
                    Value::Str(s) => s
                        .trim()
                        .parse()
                        .map_err(|_| RuntimeError::new(format!("no se puede convertir '{s}' a float")))?,
                    other => {
                        return Err(RuntimeError::new(format!(
                            "float() no soporta el tipo {}",
                            other.type_name()
                        )))
                    }
                };
                Ok(Some(Value::Float(converted)))
            }
            "str" => {
                let value = args
                    .first()
                    .ok_or_else(|| RuntimeError::new("str() requiere un argumento"))?;
                Ok(Some(Value::Str(value.to_string())))
            }
            _ => Ok(None),
        }
    }

    fn do_return(&mut self, instr: &TacInstruction) -> Result<Flow, RuntimeError> {
        let value = match &instr.arg1 {
            Some(op) => self.env.read(op)?,
            None => Value::None,
        };

        let Some(frame) = self.call_stack.pop() else {
            return Ok(Flow::Halt);
        };

        self.env = frame.saved_env;
        if let Some(dest) = frame.result_destination {
            self.env.write(&dest, value)?;
        }
        Ok(Flow::Jump(frame.return_pc))
    }

    fn del(&mut self, instr: &TacInstruction) -> Result<Flow, RuntimeError> {
        match &instr.arg2 {
            Some(index_op) => {
                let container = self.env.read(arg1(instr)?)?;
                let key = self.env.read(index_op)?;
                match container {
                    Value::List(items) => {
                        let idx = index_of(&key, items.borrow().len())?;
                        items.borrow_mut().remove(idx);
                    }
                    Value::Dict(entries) => {
                        let dict_key = DictKey::try_from(&key)?;
                        entries
                            .borrow_mut()
                            .shift_remove(&dict_key)
                            .ok_or_else(|| RuntimeError::new(format!("clave sin definir: {key}")))?;
                    }
                    other => {
                        return Err(RuntimeError::new(format!(
                            "DEL con índice sobre un valor de tipo {}",
                            other.type_name()
                        )))
                    }
                }
            }
            None => {
                let Some(Operand::Name(name)) = &instr.arg1 else {
                    return Err(RuntimeError::new("DEL sin variable destino"));
                };
                self.env
                    .vars
                    .remove(name)
                    .ok_or_else(|| RuntimeError::new(format!("variable '{name}' no definida")))?;
            }
        }
        Ok(Flow::Next)
    }
}

fn arg1(instr: &TacInstruction) -> Result<&Operand, RuntimeError> {
    instr
        .arg1
        .as_ref()
        .ok_or_else(|| RuntimeError::new(format!("{} sin arg1", instr)))
}

fn arg2(instr: &TacInstruction) -> Result<&Operand, RuntimeError> {
    instr
        .arg2
        .as_ref()
        .ok_or_else(|| RuntimeError::new(format!("{} sin arg2", instr)))
}

fn result(instr: &TacInstruction) -> Result<&Operand, RuntimeError> {
    instr
        .result
        .as_ref()
        .ok_or_else(|| RuntimeError::new(format!("{} sin destino", instr)))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Int(v) => *v != 0,
        Value::Float(v) => *v != 0.0,
        Value::Bool(v) => *v,
        Value::Str(s) => !s.is_empty(),
        Value::List(items) => !items.borrow().is_empty(),
        Value::Dict(entries) => !entries.borrow().is_empty(),
        Value::None => false,
    }
}

fn arith(op: Opcode, left: &Value, right: &Value, name: &str) -> Result<Value, RuntimeError> {
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        if op == Opcode::Add {
            return Ok(Value::Str(format!("{a}{b}")));
        }
    }

    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Err(RuntimeError::new(format!(
            "{name} no soporta los tipos {} y {}",
            left.type_name(),
            right.type_name()
        )));
    };

    let both_int = matches!(left, Value::Int(_) | Value::Bool(_)) && matches!(right, Value::Int(_) | Value::Bool(_));

    match op {
        Opcode::Add if both_int => Ok(Value::Int(a as i64 + b as i64)),
        Opcode::Add => Ok(Value::Float(a + b)),
        Opcode::Sub if both_int => Ok(Value::Int(a as i64 - b as i64)),
        Opcode::Sub => Ok(Value::Float(a - b)),
        Opcode::Mul if both_int => Ok(Value::Int(a as i64 * b as i64)),
        Opcode::Mul => Ok(Value::Float(a * b)),
        Opcode::Div => {
            if b == 0.0 {
                Err(RuntimeError::new("división por cero"))
            } else if both_int {
                Ok(Value::Int(a as i64 / b as i64))
            } else {
                Ok(Value::Float(a / b))
            }
        }
        Opcode::Mod => {
            if b == 0.0 {
                Err(RuntimeError::new("módulo por cero"))
            } else if both_int {
                Ok(Value::Int(a as i64 % b as i64))
            } else {
                Ok(Value::Float(a % b))
            }
        }
        _ => unreachable!("arith() only called for ADD/SUB/MUL/DIV/MOD"),
    }
}

fn compare(op: Opcode, left: &Value, right: &Value) -> Result<bool, RuntimeError> {
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return Ok(match op {
            Opcode::Eq => a == b,
            Opcode::Neq => a != b,
            Opcode::Lt => a < b,
            Opcode::Gt => a > b,
            Opcode::Lte => a <= b,
            Opcode::Gte => a >= b,
            _ => unreachable!(),
        });
    }

    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Err(RuntimeError::new(format!(
            "comparación no soportada entre {} y {}",
            left.type_name(),
            right.type_name()
        )));
    };

    Ok(match op {
        Opcode::Eq => a == b,
        Opcode::Neq => a != b,
        Opcode::Lt => a < b,
        Opcode::Gt => a > b,
        Opcode::Lte => a <= b,
        Opcode::Gte => a >= b,
        _ => unreachable!(),
    })
}

fn index_of(key: &Value, len: usize) -> Result<usize, RuntimeError> {
    let Value::Int(i) = key else {
        return Err(RuntimeError::new(format!(
            "índice de lista inválido: {key}"
        )));
    };
    // Negative indices are out-of-range, not a Python-style wraparound — the
    // reference interpreter guards every LIST_GET/LIST_SET/DEL with
    // `0 <= index < len`, never a negative one.
    if *i < 0 || *i as usize >= len {
        return Err(RuntimeError::new(format!("índice fuera de rango: {i}")));
    }
    Ok(*i as usize)
}

fn get_index(container: &Value, key: &Value) -> Result<Value, RuntimeError> {
    match container {
        Value::List(items) => {
            let idx = index_of(key, items.borrow().len())?;
            Ok(items.borrow()[idx].clone())
        }
        Value::Dict(entries) => {
            let dict_key = DictKey::try_from(key)?;
            entries
                .borrow()
                .get(&dict_key)
                .cloned()
                .ok_or_else(|| RuntimeError::new(format!("clave sin definir: {key}")))
        }
        other => Err(RuntimeError::new(format!(
            "el tipo {} no admite indexación",
            other.type_name()
        ))),
    }
}

fn set_index(container: &Value, key: &Value, value: Value) -> Result<(), RuntimeError> {
    match container {
        Value::List(items) => {
            let idx = index_of(key, items.borrow().len())?;
            items.borrow_mut()[idx] = value;
            Ok(())
        }
        Value::Dict(entries) => {
            let dict_key = DictKey::try_from(key)?;
            entries.borrow_mut().insert(dict_key, value);
            Ok(())
        }
        other => Err(RuntimeError::new(format!(
            "el tipo {} no admite asignación indexada",
            other.type_name()
        ))),
    }
}
