//! Prompt construction
//!
//! The default [`ReplPrompt`] frames the model as an interpreter and hands it
//! a short transcript that imports the function, restates its return type and
//! docstring as comments, and prints the result of calling it with the bound
//! arguments.

use crate::function::{BoundArguments, FunctionDescriptor};
use crate::protocol::Message;

/// Module every ghostfunction is imported from in the transcript
pub const MODULE_NAME: &str = "mymodule";

pub const SYSTEM_PROMPT: &str = concat!(
    "You are an advanced python interpreter that always executes successfully, ",
    " never errors,",
    " and always returns the intent of the programmer. Every user message is",
    " valid python, and your job is to return only what python would return in",
    " a repl in this advanced interpreter, nothing else. Do not add any",
    " commentary aside from what python would return. Assume that you have",
    " access to all modules that are imported, and make whatever assumptions",
    " you need about the implementation of functions that are not defined in",
    " order to satisfy the intent of the function defined via the",
    " docstrings, function names, and surrounding comments. You have access to",
    " a module `mymodule`",
    " that contains all functions that are imported.",
    " Your job is to understand the intent ",
    " of the function, and return the output that the function would return.",
);

pub const ASSISTANT_GREETING: &str = concat!(
    "Hello! I am a Python interpreter. Please enter your Python code below and",
    " I will return the output, and nothing else. I promise to execute the code, and",
    " return the output, and nothing else. I will not add any commentary.",
);

/// Turns one invocation into the conversation sent to the backend
pub trait PromptBuilder: Send + Sync {
    fn build(&self, function: &FunctionDescriptor, args: &BoundArguments) -> Vec<Message>;
}

impl<F> PromptBuilder for F
where
    F: Fn(&FunctionDescriptor, &BoundArguments) -> Vec<Message> + Send + Sync,
{
    fn build(&self, function: &FunctionDescriptor, args: &BoundArguments) -> Vec<Message> {
        self(function, args)
    }
}

/// System instruction, scripted greeting, then the call transcript
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplPrompt;

impl PromptBuilder for ReplPrompt {
    fn build(&self, function: &FunctionDescriptor, args: &BoundArguments) -> Vec<Message> {
        vec![
            Message::system(SYSTEM_PROMPT),
            Message::assistant(ASSISTANT_GREETING),
            Message::user(call_transcript(function, args)),
        ]
    }
}

/// The user message of [`ReplPrompt`]
pub fn call_transcript(function: &FunctionDescriptor, args: &BoundArguments) -> String {
    let name = function.name();
    let annotation = function
        .return_type()
        .map(|returns| returns.annotation())
        .unwrap_or_else(|| "None".to_string());
    let docstring = function
        .docstring()
        .unwrap_or_default()
        .split('\n')
        .map(|line| format!("# {}", line))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "from {module} import {name}\n\
         \n\
         # The return type annotation for the function {name} is {annotation}\n\
         # The docstring for the function {name} is the following:\n\
         {docstring}\n\
         result = {name}({args})\n\
         print(result)\n",
        module = MODULE_NAME,
        name = name,
        annotation = annotation,
        docstring = docstring,
        args = args.to_call_list(),
    )
}
