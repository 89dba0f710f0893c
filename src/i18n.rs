// Prompt and result strings for the interactive CLI, in English and
// Japanese. Keys are an enum so a missing translation is a compile error.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Ja,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Title,
    AskLang,
    AskAuthMode,
    ModeLogin,
    ModeToken,
    AskUsername,
    AskPassword,
    AskToken,
    AskUsernameApi,
    AskProjectId,
    AskTargetUser,
    AskCommentContent,
    ValidRequired,
    ValidNumber,
    CurrentUser,
    MenuPrompt,
    ActCheckMessages,
    ActProfile,
    ActProject,
    ActProjectComment,
    ActProfileComment,
    ActExit,
    Goodbye,
    Terminating,
    TokenNote,
    CheckingToken,
    TokenOk,
    TokenFail,
    Communicating,
    FetchingCsrf,
    LoginTry,
    LoginOk,
    LoginFail,
    Error,
    Sending,
    ResUnread,
    ResUsername,
    ResCountry,
    ResJoined,
    ResId,
    ResSearching,
    ResTitle,
    ResAuthor,
    ResFavorites,
    ResLoves,
    ResProjectError,
    ResCommentPosted,
    ResRateLimited,
    ResCommentFailed,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::En, Lang::Ja];

    /// Name shown in the language picker.
    pub fn label(self) -> &'static str {
        match self {
            Lang::En => "English",
            Lang::Ja => "日本語",
        }
    }

    pub fn text(self, msg: Msg) -> &'static str {
        match self {
            Lang::En => en(msg),
            Lang::Ja => ja(msg),
        }
    }
}

fn en(msg: Msg) -> &'static str {
    match msg {
        Msg::Title => "=== Scratch API Tool ===",
        Msg::AskLang => "Select Language / 言語を選択してください",
        Msg::AskAuthMode => "Please select an authentication method",
        Msg::ModeLogin => "🔑 Log in with username and password",
        Msg::ModeToken => "🎫 Set acquired Token (X-Token) manually",
        Msg::AskUsername => "Username",
        Msg::AskPassword => "Password",
        Msg::AskToken => "Paste your X-Token",
        Msg::AskUsernameApi => "Username (for API URL)",
        Msg::AskProjectId => "Project ID (number)",
        Msg::AskTargetUser => "Username whose profile to comment on",
        Msg::AskCommentContent => "Comment",
        Msg::ValidRequired => "This field is required.",
        Msg::ValidNumber => "Please enter a valid number.",
        Msg::CurrentUser => "Current User:",
        Msg::MenuPrompt => "What do you want to do? (Use arrow keys)",
        Msg::ActCheckMessages => "📩 Check unread messages",
        Msg::ActProfile => "👤 View profile information",
        Msg::ActProject => "🚀 Get project info (specify ID)",
        Msg::ActProjectComment => "💬 Comment on a project",
        Msg::ActProfileComment => "📝 Comment on a profile",
        Msg::ActExit => "🚪 Exit",
        Msg::Goodbye => "GoodBye!",
        Msg::Terminating => "Terminating due to authentication failure or cancellation.",
        Msg::TokenNote => "⚠️ Note: When using only X-Token, operations requiring cookies (profile comments) will be rejected.",
        Msg::CheckingToken => "Checking Token validity...",
        Msg::TokenOk => "✅ Token confirmed!",
        Msg::TokenFail => "❌ Invalid Token or Username mismatch.",
        Msg::Communicating => "Communicating...",
        Msg::FetchingCsrf => "Fetching CSRF Token...",
        Msg::LoginTry => "Attempting Login...",
        Msg::LoginOk => "✅ Login Successful! Welcome",
        Msg::LoginFail => "❌ Login Failed",
        Msg::Error => "Error:",
        Msg::Sending => "Sending comment...",
        Msg::ResUnread => "📬 Unread Messages:",
        Msg::ResUsername => "👤 Username:",
        Msg::ResCountry => "📍 Country:",
        Msg::ResJoined => "📅 Joined:",
        Msg::ResId => "🆔 ID:",
        Msg::ResSearching => "Searching for project ID:",
        Msg::ResTitle => "Title:",
        Msg::ResAuthor => "Author:",
        Msg::ResFavorites => "★ Favorites:",
        Msg::ResLoves => "♥ Loves:",
        Msg::ResProjectError => "❌ Project not found or error occurred.",
        Msg::ResCommentPosted => "✅ Comment posted!",
        Msg::ResRateLimited => "⏳ Rate limited. Wait a while before trying again.",
        Msg::ResCommentFailed => "❌ Comment was not posted.",
    }
}

fn ja(msg: Msg) -> &'static str {
    match msg {
        Msg::Title => "=== Scratch API ツール ===",
        Msg::AskLang => "Select Language / 言語を選択してください",
        Msg::AskAuthMode => "認証方法を選択してください",
        Msg::ModeLogin => "🔑 ユーザー名とパスワードでログイン",
        Msg::ModeToken => "🎫 取得済みのToken(X-Token)を手動セット",
        Msg::AskUsername => "ユーザー名",
        Msg::AskPassword => "パスワード",
        Msg::AskToken => "X-Tokenを貼り付け",
        Msg::AskUsernameApi => "ユーザー名 (API URL用)",
        Msg::AskProjectId => "プロジェクトID(数字)",
        Msg::AskTargetUser => "コメント先のユーザー名",
        Msg::AskCommentContent => "コメント",
        Msg::ValidRequired => "入力は必須です。",
        Msg::ValidNumber => "数字を入力してください。",
        Msg::CurrentUser => "現在のユーザー:",
        Msg::MenuPrompt => "何をしますか？ (矢印キーで選択)",
        Msg::ActCheckMessages => "📩 未読メッセージ数を確認",
        Msg::ActProfile => "👤 プロフィール情報を表示",
        Msg::ActProject => "🚀 プロジェクト情報を取得 (ID指定)",
        Msg::ActProjectComment => "💬 プロジェクトにコメント",
        Msg::ActProfileComment => "📝 プロフィールにコメント",
        Msg::ActExit => "🚪 終了する",
        Msg::Goodbye => "さようなら！",
        Msg::Terminating => "認証失敗またはキャンセルのため終了します。",
        Msg::TokenNote => "⚠️ 注意: X-Tokenのみを使用する場合、Cookie必須の操作(プロフィールへのコメント)は拒否されます。",
        Msg::CheckingToken => "Tokenの有効性を確認中...",
        Msg::TokenOk => "✅ Token確認成功！",
        Msg::TokenFail => "❌ Tokenが無効か、ユーザー名が一致しません。",
        Msg::Communicating => "通信中...",
        Msg::FetchingCsrf => "CSRFトークン取得中...",
        Msg::LoginTry => "ログイン試行中...",
        Msg::LoginOk => "✅ ログイン成功! ようこそ",
        Msg::LoginFail => "❌ ログイン失敗",
        Msg::Error => "エラー:",
        Msg::Sending => "コメント送信中...",
        Msg::ResUnread => "📬 未読メッセージ数:",
        Msg::ResUsername => "👤 ユーザー名:",
        Msg::ResCountry => "📍 国:",
        Msg::ResJoined => "📅 参加日:",
        Msg::ResId => "🆔 ID:",
        Msg::ResSearching => "プロジェクトを検索中 ID:",
        Msg::ResTitle => "タイトル:",
        Msg::ResAuthor => "作者:",
        Msg::ResFavorites => "★ お気に入り:",
        Msg::ResLoves => "♥ 好き:",
        Msg::ResProjectError => "❌ プロジェクトが見つからないかエラーが発生しました。",
        Msg::ResCommentPosted => "✅ コメントを送信しました！",
        Msg::ResRateLimited => "⏳ 送信制限中です。しばらく待ってから再度お試しください。",
        Msg::ResCommentFailed => "❌ コメントを送信できませんでした。",
    }
}
